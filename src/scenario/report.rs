use std::time::Duration;

use crate::error::E2eResult;
use crate::interact::executor::Action;
use crate::interact::poller::{Condition, Expectation, Outcome, OutcomeCheck};
use crate::interact::resolver::Actionability;
use crate::scenario::context::ScenarioContext;
use crate::scenario::locators::{
    report_button, report_comment, report_dialog, report_reason_option, report_reason_trigger,
    report_submit, report_toast,
};
use crate::scenario::messaging::open_first_product;

const REPORT_BUTTON_TIMEOUT: Duration = Duration::from_secs(6);
const REASON_OPTION_TIMEOUT: Duration = Duration::from_secs(10);
const SUBMIT_ENABLED_TIMEOUT: Duration = Duration::from_secs(10);

/// Extra wait after the dialog closed without a toast, so the request that
/// closed it can finish before the session ends.
const CLOSE_GRACE: Duration = Duration::from_secs(5);

/// Report the first listed product. Succeeds on the confirmation toast, or
/// failing that on the dialog closing; never on neither.
pub fn run(ctx: &mut ScenarioContext<'_>) -> E2eResult<()> {
    let comment = ctx.fixture.report_comment.clone();
    let toast_timeout = ctx.waits.toast_timeout;

    open_first_product(ctx)?;

    ctx.step("open report dialog");
    let button = ctx.resolve(&report_button(REPORT_BUTTON_TIMEOUT), Actionability::Present)?;
    ctx.force_click(&button)?;
    ctx.wait_for(Condition::Present(report_dialog()))?;

    ctx.step("choose reason");
    let trigger = ctx.find("report reason select", report_reason_trigger(), Actionability::Clickable)?;
    ctx.force_click(&trigger)?;
    let option = ctx.resolve(&report_reason_option(REASON_OPTION_TIMEOUT), Actionability::Clickable)?;
    ctx.force_click(&option)?;

    ctx.step("write comment");
    let textarea = ctx.find("report comment", report_comment(), Actionability::Visible)?;
    ctx.act_with_fallback(&textarea, Action::ClearAndType(comment))?;

    ctx.step("submit report");
    let submit = ctx.find("send report button", report_submit(), Actionability::Present)?;
    ctx.wait_for_within(
        Condition::Enabled {
            element: submit.clone(),
            accepted: vec![String::new()],
        },
        SUBMIT_ENABLED_TIMEOUT,
    )?;
    ctx.force_click(&submit)?;

    let check = OutcomeCheck::new(
        "report sent",
        Expectation::new(Condition::Present(report_toast()), toast_timeout),
    )
    .or_accept(Expectation::new(Condition::Hidden(report_dialog()), toast_timeout));

    if let Outcome::Fallback { .. } = ctx.verify(&check)? {
        ctx.pause(CLOSE_GRACE);
    }
    Ok(())
}
