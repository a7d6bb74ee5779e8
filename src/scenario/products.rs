use crate::browser::protocol::{ElementRef, Locator};
use crate::error::E2eResult;
use crate::interact::executor::{Action, ActionMode};
use crate::interact::poller::{Condition, Expectation, Requirement};
use crate::interact::resolver::Actionability;
use crate::scenario::context::ScenarioContext;
use crate::scenario::locators::{
    category_option, category_trigger, edit_menu_item, heading, mark_sold_menu_item,
    marked_sold_toast, name_filter, open_menu, option_containing, product_updated_toast,
    products_table, row_menu_trigger, search_button, status_filter_trigger, submit_button,
    table_row_named, ROUTE_MY_PRODUCTS, ROUTE_PRODUCT_CREATE,
};

const ACTIVE_STATUS: &str = "Activo";

fn optional_toast(ctx: &mut ScenarioContext<'_>, name: &str, locator: Locator) -> E2eResult<bool> {
    let timeout = ctx.waits.default_timeout;
    ctx.observe(
        name,
        Expectation::new(Condition::Visible(locator), timeout),
        Requirement::Optional,
    )
}

fn search(ctx: &mut ScenarioContext<'_>) -> E2eResult<()> {
    let button = ctx.find("search button", search_button(), Actionability::Clickable)?;
    ctx.click(&button)?;
    Ok(())
}

// ============================================================================
// create-product
// ============================================================================

pub fn create(ctx: &mut ScenarioContext<'_>) -> E2eResult<()> {
    let draft = ctx.fixture.product.clone();

    ctx.step("open product form");
    ctx.open(ROUTE_PRODUCT_CREATE)?;
    ctx.wait_for(Condition::Visible(heading("Crear Producto")))?;

    ctx.step("fill product form");
    ctx.fill("name field", Locator::id("name"), &draft.name)?;
    ctx.fill("description field", Locator::id("description"), &draft.description)?;

    let trigger = ctx.find("category select", category_trigger(), Actionability::Clickable)?;
    ctx.click(&trigger)?;
    let option = ctx.find("category option", category_option(&draft.category), Actionability::Clickable)?;
    ctx.click(&option)?;

    ctx.fill("price field", Locator::id("price"), &draft.price)?;
    ctx.fill("location field", Locator::id("location"), &draft.location)?;

    ctx.step("publish product");
    let publish = ctx.find("publish button", submit_button(), Actionability::Clickable)?;
    ctx.click(&publish)?;
    ctx.wait_for(Condition::UrlContains(ROUTE_MY_PRODUCTS.to_string()))?;
    Ok(())
}

// ============================================================================
// Shared navigation for edit-product / mark-sold
// ============================================================================

/// Open "Mis Productos", filter on active products and open the action menu
/// of the first visible row.
fn open_first_row_menu(ctx: &mut ScenarioContext<'_>) -> E2eResult<()> {
    ctx.step("open my products");
    ctx.open(ROUTE_MY_PRODUCTS)?;
    ctx.wait_for(Condition::Visible(heading("Mis Productos")))?;

    ctx.step("filter active products");
    let status = ctx.find("status filter", status_filter_trigger(), Actionability::Clickable)?;
    ctx.click(&status)?;
    let active = ctx.find("active status option", option_containing(ACTIVE_STATUS), Actionability::Clickable)?;
    ctx.click(&active)?;
    search(ctx)?;
    // The select popover closes asynchronously and swallows clicks until it does
    ctx.settle();

    ctx.step("open row menu");
    ctx.wait_for(Condition::Present(products_table()))?;
    let triggers = ctx.browser().find_all(&row_menu_trigger())?;
    ctx.ensure("row menus in table", !triggers.is_empty(), || {
        "no row menu buttons inside the table".to_string()
    })?;
    let trigger = first_displayed(ctx, &triggers)?;
    ctx.ensure("visible row menu", trigger.is_some(), || {
        "no visible row menu button in the table".to_string()
    })?;
    if let Some(trigger) = trigger {
        ctx.act(&trigger, Action::Click, ActionMode::Standard)?;
    }
    ctx.wait_for(Condition::Visible(open_menu()))?;
    Ok(())
}

fn first_displayed(ctx: &mut ScenarioContext<'_>, elements: &[ElementRef]) -> E2eResult<Option<ElementRef>> {
    for element in elements {
        if ctx.browser().is_displayed(element)? {
            return Ok(Some(element.clone()));
        }
    }
    Ok(None)
}

// ============================================================================
// edit-product
// ============================================================================

pub fn edit(ctx: &mut ScenarioContext<'_>) -> E2eResult<()> {
    let edit = ctx.fixture.product_edit.clone();

    open_first_row_menu(ctx)?;
    let item = ctx.find("edit menu item", edit_menu_item(), Actionability::Clickable)?;
    ctx.click(&item)?;

    ctx.step("edit product");
    ctx.wait_for(Condition::Visible(heading("Editar Producto")))?;
    let fields = [
        ("name field", "name", edit.name.clone()),
        ("description field", "description", edit.description.clone()),
        ("price field", "price", edit.price.clone()),
    ];
    for (target, id, value) in fields {
        let input = ctx.find(target, Locator::id(id), Actionability::Visible)?;
        ctx.act(&input, Action::ReplaceText(value), ActionMode::Standard)?;
    }

    ctx.step("save product");
    let save = ctx.find("save button", submit_button(), Actionability::Clickable)?;
    ctx.click(&save)?;
    ctx.wait_for(Condition::UrlContains(ROUTE_MY_PRODUCTS.to_string()))?;
    optional_toast(ctx, "product updated toast", product_updated_toast())?;

    ctx.step("find edited product");
    ctx.fill("name filter", name_filter(), &edit.name)?;
    search(ctx)?;
    ctx.wait_for(Condition::Present(products_table()))?;
    let timeout = ctx.waits.default_timeout;
    ctx.observe(
        "edited product listed",
        Expectation::new(Condition::Visible(table_row_named(&edit.name)), timeout),
        Requirement::Required,
    )?;
    Ok(())
}

// ============================================================================
// mark-sold
// ============================================================================

pub fn mark_sold(ctx: &mut ScenarioContext<'_>) -> E2eResult<()> {
    open_first_row_menu(ctx)?;

    ctx.step("mark product sold");
    let item = ctx.find("mark sold menu item", mark_sold_menu_item(), Actionability::Clickable)?;
    ctx.click(&item)?;
    optional_toast(ctx, "marked sold toast", marked_sold_toast())?;
    Ok(())
}
