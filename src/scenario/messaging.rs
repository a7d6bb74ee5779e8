use std::time::Duration;

use tracing::debug;

use crate::browser::protocol::ElementRef;
use crate::error::E2eResult;
use crate::interact::executor::Action;
use crate::interact::poller::{Condition, Expectation, OutcomeCheck};
use crate::interact::resolver::Actionability;
use crate::scenario::context::ScenarioContext;
use crate::scenario::favorites::open_products;
use crate::scenario::locators::{
    chat_input, chat_input_any, chat_send_button, contact_seller, message_toast, page_body,
    product_detail_link, CHAT_SEND_BUTTON_SCRIPT, ROUTE_PRODUCT_DETAIL,
};

const DETAIL_LINK_TIMEOUT: Duration = Duration::from_secs(5);
const CONTACT_TIMEOUT: Duration = Duration::from_secs(6);
const SEND_ENABLED_TIMEOUT: Duration = Duration::from_secs(10);

/// From the dashboard, open the detail page of the first listed product.
pub fn open_first_product(ctx: &mut ScenarioContext<'_>) -> E2eResult<()> {
    ctx.step("open first product");
    open_products(ctx)?;

    let link = ctx.resolve(&product_detail_link(DETAIL_LINK_TIMEOUT), Actionability::Clickable)?;
    ctx.click(&link)?;
    ctx.wait_for(Condition::UrlContains(ROUTE_PRODUCT_DETAIL.to_string()))?;
    ctx.wait_for(Condition::Present(page_body()))?;
    Ok(())
}

/// Send button of the chat footer: located by script first, XPath otherwise.
fn send_button(ctx: &mut ScenarioContext<'_>) -> E2eResult<ElementRef> {
    let found = ctx.browser().execute_script(CHAT_SEND_BUTTON_SCRIPT, Vec::new())?;
    if let Some(button) = ElementRef::from_json(&found) {
        return Ok(button);
    }
    debug!("send button not found by script; trying xpath");
    ctx.find("chat send button", chat_send_button(), Actionability::Present)
}

pub fn run(ctx: &mut ScenarioContext<'_>) -> E2eResult<()> {
    let message = ctx.fixture.message.clone();
    let toast_timeout = ctx.waits.toast_timeout;

    open_first_product(ctx)?;

    ctx.step("contact seller");
    let contact = ctx.resolve(&contact_seller(CONTACT_TIMEOUT), Actionability::Clickable)?;
    ctx.force_click(&contact)?;

    ctx.step("write message");
    let input = ctx.find("chat input", chat_input(), Actionability::Visible)?;
    ctx.act_with_fallback(&input, Action::ClearAndType(message))?;

    ctx.step("send message");
    let send = send_button(ctx)?;
    ctx.wait_for_within(
        Condition::Enabled {
            element: send.clone(),
            accepted: vec![String::new()],
        },
        SEND_ENABLED_TIMEOUT,
    )?;
    ctx.force_click(&send)?;

    let check = OutcomeCheck::new(
        "message sent",
        Expectation::new(Condition::Present(message_toast()), toast_timeout),
    )
    .or_accept(Expectation::new(
        Condition::ValueEquals(chat_input_any(), String::new()),
        toast_timeout,
    ));
    ctx.verify(&check)?;
    Ok(())
}
