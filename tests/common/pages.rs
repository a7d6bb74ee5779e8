//! Fake marketplace pages built from the suite's own locators.

use marketplace_e2e::browser::protocol::Locator;
use marketplace_e2e::interact::resolver::CandidateList;
use marketplace_e2e::scenario::locators::*;

use super::fake_browser::{Effect, FakeDom, FakeElement};

pub const DETAIL_ROUTE: &str = "/products/7";

/// First locator of a candidate list.
pub fn first(list: &CandidateList) -> Locator {
    list.candidates[0].locator.clone()
}

/// Login form; the submit button lands on the dashboard when `accepts`.
pub fn login_page(dom: &mut FakeDom, accepts: bool) {
    dom.add(FakeElement::new("body", page_body()));
    dom.add(FakeElement::new("login-email", login_email()).on(ROUTE_LOGIN));
    dom.add(FakeElement::new("login-password", login_password()).on(ROUTE_LOGIN));
    let submit = FakeElement::new("login-submit", submit_button()).on(ROUTE_LOGIN);
    dom.add(if accepts {
        submit.on_click(Effect::Navigate(ROUTE_DASHBOARD.to_string()))
    } else {
        submit
    });
}

/// Sidebar links and the product grid container.
pub fn shell(dom: &mut FakeDom) {
    dom.add(
        FakeElement::new("nav-products", first(&nav_products()))
            .on_click(Effect::Navigate(ROUTE_PRODUCTS.to_string())),
    );
    dom.add(
        FakeElement::new("nav-favorites", first(&nav_favorites()))
            .on_click(Effect::Navigate(ROUTE_FAVORITES.to_string())),
    );
    dom.add(FakeElement::new("grid", product_grid()));
}

/// Signed-in buyer: login form, sidebar and grid.
pub fn buyer_session(dom: &mut FakeDom) {
    login_page(dom, true);
    shell(dom);
}

/// A card with a title on `route`. Returns the card key.
pub fn card(dom: &mut FakeDom, route: &str, key: &str, title: &str) -> String {
    dom.add(FakeElement::new(key, product_card()).on(route));
    dom.add(
        FakeElement::new(&format!("{}-title", key), card_title())
            .on(route)
            .inside(key)
            .text(title),
    );
    key.to_string()
}

/// Catalog card whose heart adds `favorite_key` to /favorites and shows the toast.
pub fn catalog_card(dom: &mut FakeDom, key: &str, title: &str, favorite_key: &str) {
    card(dom, ROUTE_PRODUCTS, key, title);
    dom.add(
        FakeElement::new(&format!("{}-heart", key), first(&favorite_button()))
            .on(ROUTE_PRODUCTS)
            .inside(key)
            .on_click(Effect::Attach(favorite_key.to_string()))
            .on_click(Effect::Attach("favorite-toast".to_string())),
    );
}

/// Card on /favorites whose heart-off button removes it.
pub fn favorite_card(dom: &mut FakeDom, key: &str, title: &str, listed: bool) {
    card(dom, ROUTE_FAVORITES, key, title);
    if !listed {
        dom.set_attached(key, false);
    }
    dom.add(
        FakeElement::new(&format!("{}-heart-off", key), first(&unfavorite_button()))
            .on(ROUTE_FAVORITES)
            .inside(key)
            .on_click(Effect::Detach(key.to_string()))
            .on_click(Effect::Attach("favorite-toast".to_string())),
    );
}

pub fn favorite_toast_slot(dom: &mut FakeDom) {
    dom.add(FakeElement::new("favorite-toast", favorite_toast()).detached());
}

/// One catalog card whose detail link opens `DETAIL_ROUTE`.
pub fn catalog_with_detail(dom: &mut FakeDom) {
    card(dom, ROUTE_PRODUCTS, "p-1", "Bicicleta");
    dom.add(
        FakeElement::new(
            "detail-link",
            first(&product_detail_link(std::time::Duration::ZERO)),
        )
        .on(ROUTE_PRODUCTS)
        .on_click(Effect::Navigate(DETAIL_ROUTE.to_string())),
    );
}

/// Contact button on the detail page, the chat footer on `chat_route`.
/// Sending empties the input; the toast shows only when `toast`.
pub fn chat(dom: &mut FakeDom, chat_route: &str, toast: bool) {
    let contact = FakeElement::new(
        "contact-seller",
        first(&contact_seller(std::time::Duration::ZERO)),
    )
    .on(DETAIL_ROUTE);
    dom.add(if chat_route == DETAIL_ROUTE {
        contact
    } else {
        contact.on_click(Effect::Navigate(chat_route.to_string()))
    });

    dom.add(
        FakeElement::new("chat-input", chat_input())
            .also(chat_input_any())
            .on(chat_route),
    );
    let mut send = FakeElement::new("chat-send", chat_send_button())
        .on(chat_route)
        .on_click(Effect::SetValue("chat-input".to_string(), String::new()));
    if toast {
        send = send.on_click(Effect::Attach("message-toast".to_string()));
    }
    dom.add(send);
    dom.add(FakeElement::new("message-toast", message_toast()).detached());
}

/// Report button and dialog on the detail page. Submitting closes the
/// dialog; the toast shows only when `toast`.
pub fn report_flow(dom: &mut FakeDom, toast: bool) {
    dom.add(
        FakeElement::new("report-button", first(&report_button(std::time::Duration::ZERO)))
            .on(DETAIL_ROUTE)
            .on_click(Effect::Attach("report-dialog".to_string())),
    );
    dom.add(FakeElement::new("report-dialog", report_dialog()).on(DETAIL_ROUTE).detached());
    dom.add(
        FakeElement::new("reason-trigger", report_reason_trigger())
            .on(DETAIL_ROUTE)
            .on_click(Effect::Attach("reason-option".to_string())),
    );
    dom.add(
        FakeElement::new("reason-option", first(&report_reason_option(std::time::Duration::ZERO)))
            .on(DETAIL_ROUTE)
            .detached(),
    );
    dom.add(FakeElement::new("report-comment", report_comment()).on(DETAIL_ROUTE));
    let mut submit = FakeElement::new("report-submit", report_submit())
        .on(DETAIL_ROUTE)
        .on_click(Effect::Detach("report-dialog".to_string()));
    if toast {
        submit = submit.on_click(Effect::Attach("report-toast".to_string()));
    }
    dom.add(submit);
    dom.add(FakeElement::new("report-toast", report_toast()).detached());
}

/// Sign-up form; the submit button lands on the dashboard.
pub fn registration_form(dom: &mut FakeDom) {
    dom.add(FakeElement::new("body", page_body()));
    dom.add(FakeElement::new("register-card", register_card()).on(ROUTE_REGISTER));
    for id in [
        "firstName",
        "lastName",
        "nationalId",
        "email",
        "phone",
        "address",
        "password",
        "confirmPassword",
    ] {
        dom.add(FakeElement::new(&format!("reg-{}", id), Locator::id(id)).on(ROUTE_REGISTER));
    }
    dom.add(
        FakeElement::new("role-trigger", role_trigger())
            .on(ROUTE_REGISTER)
            .on_click(Effect::Attach("role-option".to_string())),
    );
    dom.add(
        FakeElement::new(
            "role-option",
            first(&role_option("Comprador", std::time::Duration::ZERO)),
        )
        .on(ROUTE_REGISTER)
        .detached(),
    );
    dom.add(
        FakeElement::new("register-submit", register_submit())
            .on(ROUTE_REGISTER)
            .on_click(Effect::Navigate(ROUTE_DASHBOARD.to_string())),
    );
}

/// User menu and settings dialog on the dashboard. Inputs show up once
/// "Configuración" is clicked; saving shows the toast.
pub fn profile_dialog(dom: &mut FakeDom) {
    dom.add(
        FakeElement::new("user-menu", user_menu_trigger())
            .on(ROUTE_DASHBOARD)
            .on_click(Effect::Attach("user-menu-open".to_string())),
    );
    dom.add(FakeElement::new("user-menu-open", open_menu()).on(ROUTE_DASHBOARD).detached());

    let mut settings = FakeElement::new("settings-item", settings_menu_item()).on(ROUTE_DASHBOARD);
    for label in PROFILE_LABELS {
        let key = format!("profile-{}", label);
        dom.add(
            FakeElement::new(&key, input_after_label(label))
                .on(ROUTE_DASHBOARD)
                .value("viejo")
                .detached(),
        );
        settings = settings.on_click(Effect::Attach(key));
    }
    dom.add(settings);

    dom.add(
        FakeElement::new("profile-save", save_profile_button())
            .on(ROUTE_DASHBOARD)
            .on_click(Effect::Attach("profile-toast".to_string())),
    );
    dom.add(FakeElement::new("profile-toast", profile_toast()).detached());
}

pub const PROFILE_LABELS: [&str; 4] = ["Nombre", "Apellido", "Teléfono", "Dirección"];

/// Create-product form; publishing lands on /my-products.
pub fn create_form(dom: &mut FakeDom) {
    dom.add(FakeElement::new("create-heading", heading("Crear Producto")).on(ROUTE_PRODUCT_CREATE));
    for id in ["name", "description", "price", "location"] {
        dom.add(FakeElement::new(&format!("product-{}", id), Locator::id(id)).on(ROUTE_PRODUCT_CREATE));
    }
    dom.add(
        FakeElement::new("category-trigger", category_trigger())
            .on(ROUTE_PRODUCT_CREATE)
            .on_click(Effect::Attach("category-option".to_string())),
    );
    dom.add(
        FakeElement::new("category-option", category_option("Hogar"))
            .on(ROUTE_PRODUCT_CREATE)
            .detached(),
    );
    dom.add(
        FakeElement::new("publish", submit_button())
            .on(ROUTE_PRODUCT_CREATE)
            .on_click(Effect::Navigate(ROUTE_MY_PRODUCTS.to_string())),
    );
}

pub const EDIT_ROUTE: &str = "/products/9/edit";

/// "Mis Productos" with a status filter, a table whose first row menu is
/// hidden, and the edit form on `EDIT_ROUTE`. Saving the form lists the
/// edited row and shows the update toast; "Marcar vendido" shows its toast.
pub fn my_products(dom: &mut FakeDom, edited_name: &str) {
    dom.add(FakeElement::new("my-products-heading", heading("Mis Productos")).on(ROUTE_MY_PRODUCTS));
    dom.add(
        FakeElement::new("status-filter", status_filter_trigger())
            .on(ROUTE_MY_PRODUCTS)
            .on_click(Effect::Attach("status-active".to_string())),
    );
    dom.add(
        FakeElement::new("status-active", option_containing("Activo"))
            .on(ROUTE_MY_PRODUCTS)
            .detached(),
    );
    dom.add(FakeElement::new("search", search_button()).on(ROUTE_MY_PRODUCTS));
    dom.add(FakeElement::new("name-filter", name_filter()).on(ROUTE_MY_PRODUCTS));
    dom.add(FakeElement::new("table", products_table()).on(ROUTE_MY_PRODUCTS));

    dom.add(FakeElement::new("row-hidden", row_menu_trigger()).on(ROUTE_MY_PRODUCTS).hidden());
    dom.add(
        FakeElement::new("row-visible", row_menu_trigger())
            .on(ROUTE_MY_PRODUCTS)
            .on_click(Effect::Attach("row-menu".to_string())),
    );
    dom.add(FakeElement::new("row-menu", open_menu()).on(ROUTE_MY_PRODUCTS).detached());
    dom.add(
        FakeElement::new("edit-item", edit_menu_item())
            .on(ROUTE_MY_PRODUCTS)
            .on_click(Effect::Navigate(EDIT_ROUTE.to_string())),
    );
    dom.add(
        FakeElement::new("sold-item", mark_sold_menu_item())
            .on(ROUTE_MY_PRODUCTS)
            .on_click(Effect::Attach("sold-toast".to_string())),
    );
    dom.add(FakeElement::new("sold-toast", marked_sold_toast()).detached());

    dom.add(FakeElement::new("edit-heading", heading("Editar Producto")).on(EDIT_ROUTE));
    for (id, old) in [("name", "Cama vieja"), ("description", "Usada"), ("price", "80")] {
        dom.add(
            FakeElement::new(&format!("edit-{}", id), Locator::id(id))
                .on(EDIT_ROUTE)
                .value(old),
        );
    }
    dom.add(
        FakeElement::new("edit-save", submit_button())
            .on(EDIT_ROUTE)
            .on_click(Effect::Navigate(ROUTE_MY_PRODUCTS.to_string()))
            .on_click(Effect::Attach("edited-row".to_string()))
            .on_click(Effect::Attach("updated-toast".to_string())),
    );
    dom.add(FakeElement::new("updated-toast", product_updated_toast()).detached());
    dom.add(
        FakeElement::new("edited-row", table_row_named(edited_name))
            .on(ROUTE_MY_PRODUCTS)
            .detached(),
    );
}
