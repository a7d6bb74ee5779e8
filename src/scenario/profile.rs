use crate::error::E2eResult;
use crate::interact::executor::Action;
use crate::interact::poller::{Condition, Expectation, Requirement};
use crate::interact::resolver::Actionability;
use crate::scenario::context::ScenarioContext;
use crate::scenario::locators::{
    input_after_label, open_menu, page_body, profile_toast, save_profile_button,
    settings_menu_item, user_menu_trigger,
};

/// Edit the signed-in user's profile through the settings dialog.
pub fn run(ctx: &mut ScenarioContext<'_>) -> E2eResult<()> {
    let profile = ctx.fixture.profile.clone();

    ctx.step("open settings");
    ctx.wait_for(Condition::Present(page_body()))?;
    let trigger = ctx.find("user menu", user_menu_trigger(), Actionability::Clickable)?;
    ctx.click(&trigger)?;
    ctx.wait_for(Condition::Visible(open_menu()))?;
    let settings = ctx.find("settings menu item", settings_menu_item(), Actionability::Clickable)?;
    ctx.click(&settings)?;

    ctx.step("fill profile form");
    let fields = [
        ("Nombre", profile.first_name),
        ("Apellido", profile.last_name),
        ("Teléfono", profile.phone),
        ("Dirección", profile.address),
    ];
    let mut inputs = Vec::with_capacity(fields.len());
    for (label, _) in &fields {
        inputs.push(ctx.find(label, input_after_label(label), Actionability::Visible)?);
    }
    for (input, (_, value)) in inputs.iter().zip(fields) {
        ctx.act_with_fallback(input, Action::ClearAndType(value))?;
    }

    ctx.step("save profile");
    let save = ctx.find("save profile button", save_profile_button(), Actionability::Clickable)?;
    ctx.click(&save)?;

    let timeout = ctx.waits.default_timeout;
    ctx.observe(
        "profile updated toast",
        Expectation::new(Condition::Visible(profile_toast()), timeout),
        Requirement::Optional,
    )?;
    Ok(())
}
