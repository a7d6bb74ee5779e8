use crate::error::E2eResult;
use crate::interact::executor::Action;
use crate::interact::poller::Condition;
use crate::interact::resolver::Actionability;
use crate::scenario::context::ScenarioContext;
use crate::scenario::fixture::Credentials;
use crate::scenario::locators::{
    login_email, login_password, page_body, submit_button, ROUTE_DASHBOARD, ROUTE_LOGIN,
};

/// Sign in through the login form and wait for the dashboard.
pub fn sign_in(ctx: &mut ScenarioContext<'_>, credentials: &Credentials) -> E2eResult<()> {
    ctx.step("sign in");
    ctx.open(ROUTE_LOGIN)?;

    let email = ctx.find("email field", login_email(), Actionability::Visible)?;
    ctx.act_with_fallback(&email, Action::Type(credentials.email.clone()))?;

    let password = ctx.find("password field", login_password(), Actionability::Visible)?;
    ctx.act_with_fallback(&password, Action::Type(credentials.password.clone()))?;

    let submit = ctx.find("login submit", submit_button(), Actionability::Clickable)?;
    ctx.click(&submit)?;

    ctx.wait_for(Condition::UrlContains(ROUTE_DASHBOARD.to_string()))?;
    ctx.wait_for(Condition::Present(page_body()))?;
    Ok(())
}

/// The `login` scenario: signing in is the whole journey, so only the landing
/// page is checked here.
pub fn run(ctx: &mut ScenarioContext<'_>) -> E2eResult<()> {
    ctx.step("verify dashboard");
    let url = ctx.current_url()?;
    ctx.ensure("landed on dashboard", url.contains(ROUTE_DASHBOARD), || {
        format!("current url is {}", url)
    })
}
