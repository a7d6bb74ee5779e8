use std::time::{Duration, SystemTime, UNIX_EPOCH};

use tracing::info;

use crate::browser::protocol::Locator;
use crate::error::E2eResult;
use crate::interact::poller::{Condition, Expectation, OutcomeCheck};
use crate::interact::resolver::Actionability;
use crate::scenario::context::ScenarioContext;
use crate::scenario::locators::{
    error_alert, page_body, register_card, register_submit, register_success, role_option,
    role_trigger, ROUTE_DASHBOARD, ROUTE_REGISTER,
};

const ROLE_OPTION_TIMEOUT: Duration = Duration::from_secs(10);
const SUBMIT_ENABLED_TIMEOUT: Duration = Duration::from_secs(5);
const REDIRECT_TIMEOUT: Duration = Duration::from_secs(10);

/// Sign up a new account with a unique email address.
pub fn run(ctx: &mut ScenarioContext<'_>) -> E2eResult<()> {
    let data = ctx.fixture.registration.clone();
    let toast_timeout = ctx.waits.toast_timeout;
    let now = SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|d| d.as_secs())
        .unwrap_or_default();
    let email = data.email_for(now);

    ctx.step("open registration form");
    ctx.open(ROUTE_REGISTER)?;
    ctx.wait_for(Condition::Present(page_body()))?;
    ctx.wait_for(Condition::Present(register_card()))?;

    ctx.step("fill identity");
    ctx.fill("first name field", Locator::id("firstName"), &data.first_name)?;
    ctx.fill("last name field", Locator::id("lastName"), &data.last_name)?;
    ctx.fill("national id field", Locator::id("nationalId"), &data.national_id)?;
    ctx.fill("email field", Locator::id("email"), &email)?;
    ctx.fill("phone field", Locator::id("phone"), &data.phone)?;
    ctx.fill("address field", Locator::id("address"), &data.address)?;
    info!(%email, "registering");

    ctx.step("choose role");
    let trigger = ctx.find("role select", role_trigger(), Actionability::Clickable)?;
    ctx.force_click(&trigger)?;
    let option = ctx.resolve(&role_option(&data.role, ROLE_OPTION_TIMEOUT), Actionability::Clickable)?;
    ctx.force_click(&option)?;

    ctx.step("set password");
    ctx.fill("password field", Locator::id("password"), &data.password)?;
    ctx.fill("confirm password field", Locator::id("confirmPassword"), &data.password)?;

    ctx.step("submit registration");
    let submit = ctx.find("create account button", register_submit(), Actionability::Clickable)?;
    ctx.wait_for_within(
        Condition::Enabled {
            element: submit.clone(),
            accepted: vec!["false".to_string()],
        },
        SUBMIT_ENABLED_TIMEOUT,
    )?;
    ctx.force_click(&submit)?;

    let check = OutcomeCheck::new(
        "account created",
        Expectation::new(Condition::UrlContains(ROUTE_DASHBOARD.to_string()), REDIRECT_TIMEOUT),
    )
    .or_accept(Expectation::new(Condition::Present(register_success()), toast_timeout))
    .or_accept(Expectation::new(Condition::Absent(error_alert()), Duration::ZERO));
    ctx.verify(&check)?;
    Ok(())
}
