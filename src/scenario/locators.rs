//! Locators for the marketplace UI.
//!
//! The application renders shadcn/radix components, so most selectors key on
//! `data-slot`, `role` and lucide icon classes rather than on ids.

use std::time::Duration;

use crate::browser::protocol::Locator;
use crate::interact::resolver::CandidateList;

// ============================================================================
// Routes
// ============================================================================

pub const ROUTE_LOGIN: &str = "/login";
pub const ROUTE_REGISTER: &str = "/register";
pub const ROUTE_DASHBOARD: &str = "/dashboard";
pub const ROUTE_PRODUCTS: &str = "/products";
pub const ROUTE_PRODUCT_DETAIL: &str = "/products/";
pub const ROUTE_PRODUCT_CREATE: &str = "/products/create";
pub const ROUTE_MY_PRODUCTS: &str = "/my-products";
pub const ROUTE_FAVORITES: &str = "/favorites";
pub const ROUTE_CHAT: &str = "/chat";

/// Quote `value` as an XPath 1.0 string literal. XPath has no escapes, so a
/// value holding both quote kinds is split into a `concat(...)`.
pub fn xpath_literal(value: &str) -> String {
    if !value.contains('\'') {
        format!("'{}'", value)
    } else if !value.contains('"') {
        format!("\"{}\"", value)
    } else {
        let parts: Vec<String> = value.split('\'').map(|part| format!("'{}'", part)).collect();
        format!("concat({})", parts.join(", \"'\", "))
    }
}

// ============================================================================
// Login
// ============================================================================

pub fn login_email() -> Locator {
    Locator::id("email")
}

pub fn login_password() -> Locator {
    Locator::id("password")
}

pub fn submit_button() -> Locator {
    Locator::css("button[type='submit']")
}

pub fn page_body() -> Locator {
    Locator::tag("body")
}

// ============================================================================
// Navigation
// ============================================================================

pub fn nav_products() -> CandidateList {
    CandidateList::single(
        "products nav link",
        Locator::xpath("//a[.//span[normalize-space()='Productos']]"),
    )
}

pub fn nav_favorites() -> CandidateList {
    CandidateList::new("favorites nav link")
        .or(Locator::xpath(
            "//a[@href='/favorites' and .//span[normalize-space()='Favoritos']]",
        ))
        .or(Locator::xpath("//a[.//span[normalize-space()='Favoritos']]"))
}

// ============================================================================
// Product cards
// ============================================================================

pub fn product_card() -> Locator {
    Locator::css("div[data-slot='card']")
}

pub fn product_grid() -> Locator {
    Locator::xpath(
        "//div[contains(@class,'grid') and contains(@class,'grid-cols-')]\
         |//div[contains(@class,'grid') and contains(@class,'gap-6')]",
    )
}

/// Title inside a card.
pub fn card_title() -> Locator {
    Locator::xpath(".//div[@data-slot='card-title' or self::h3]")
}

/// Heart toggle inside a card that is not yet a favorite. The card is
/// already rendered, so each candidate is tried once.
pub fn favorite_button() -> CandidateList {
    CandidateList::new("favorite button")
        .or_within(
            Locator::xpath(".//button[@type='button' and .//svg[contains(@class,'lucide-heart')]]"),
            Duration::ZERO,
        )
        .or_within(
            Locator::xpath(
                ".//div[contains(@class,'relative')]//button[@type='button' and contains(@class,'absolute') \
                 and contains(@class,'top-3') and contains(@class,'right-3')]",
            ),
            Duration::ZERO,
        )
}

/// Heart-off toggle inside a favorited card.
pub fn unfavorite_button() -> CandidateList {
    CandidateList::new("unfavorite button")
        .or_within(
            Locator::xpath(".//button[@type='button' and .//svg[contains(@class,'lucide-heart-off')]]"),
            Duration::ZERO,
        )
        .or_within(
            Locator::xpath(
                ".//button[@type='button' and contains(@class,'absolute') and contains(@class,'top') \
                 and contains(@class,'right')]",
            ),
            Duration::ZERO,
        )
}

pub fn favorite_toast() -> Locator {
    Locator::xpath("//*[contains(normalize-space(),'Favorito actualizado')]")
}

/// Link or button leading from the first card to its detail page.
pub fn product_detail_link(per_candidate: Duration) -> CandidateList {
    const FIRST_CARD: &str = "(//div[@data-slot='card'])[1]";
    CandidateList::new("product detail link")
        .or_within(
            Locator::xpath(format!(
                "{}//a[contains(@href,'/products/') and @data-slot='button']",
                FIRST_CARD
            )),
            per_candidate,
        )
        .or_within(
            Locator::xpath(format!("{}//a[contains(@href,'/products/') ]", FIRST_CARD)),
            per_candidate,
        )
        .or_within(
            Locator::xpath(format!(
                "{}//button[.//span[normalize-space()='Ver Detalles']]",
                FIRST_CARD
            )),
            per_candidate,
        )
        .or_within(
            Locator::xpath(format!(
                "{}//*[self::a or self::button][.//span[normalize-space()='Ver Detalles'] \
                 or contains(@href,'/products/')]",
                FIRST_CARD
            )),
            per_candidate,
        )
        .or_within(
            Locator::xpath("//a[contains(@href,'/products/')][1]"),
            per_candidate,
        )
}

// ============================================================================
// Report dialog
// ============================================================================

pub fn report_button(per_candidate: Duration) -> CandidateList {
    CandidateList::new("report button")
        .or_within(
            Locator::xpath(
                "//button[@type='button' and @title='Reportar producto' \
                 and .//svg[contains(@class,'lucide-flag')]]",
            ),
            per_candidate,
        )
        .or_within(
            Locator::xpath("//button[.//svg[contains(@class,'lucide-flag')]]"),
            per_candidate,
        )
        .or_within(Locator::css("button[title='Reportar producto']"), per_candidate)
}

pub fn report_dialog() -> Locator {
    Locator::xpath("//div[@role='dialog' and .//h2[normalize-space()='Reportar Producto']]")
}

pub fn report_reason_trigger() -> Locator {
    Locator::xpath("//div[@role='dialog']//button[@role='combobox' and @data-slot='select-trigger']")
}

pub fn report_reason_option(per_candidate: Duration) -> CandidateList {
    CandidateList::new("report reason option")
        .or_within(
            Locator::xpath(
                "//*[contains(@class,'content') or contains(@class,'viewport') or contains(@id,'radix')]\
                 [.//*[@data-slot='select-item' or @role='option'] ]\
                 //*[@data-slot='select-item' or @role='option'][1]",
            ),
            per_candidate,
        )
        .or_within(
            Locator::xpath("//*[@data-slot='select-item' or @role='option'][1]"),
            per_candidate,
        )
}

pub fn report_comment() -> Locator {
    Locator::xpath("//div[@role='dialog']//textarea[@id='comment' or @data-slot='textarea']")
}

pub fn report_submit() -> Locator {
    Locator::xpath("//div[@role='dialog']//button[normalize-space()='Enviar Reporte']")
}

pub fn report_toast() -> Locator {
    Locator::xpath(
        "//*[contains(normalize-space(.),'Reporte enviado') or contains(normalize-space(.),'Reporte') \
         and contains(normalize-space(.),'enviado')]",
    )
}

// ============================================================================
// Messaging
// ============================================================================

pub fn contact_seller(per_candidate: Duration) -> CandidateList {
    CandidateList::new("contact seller button")
        .or_within(
            Locator::xpath(
                "//button[.//svg[contains(@class,'lucide-message-circle')] \
                 and contains(normalize-space(.),'Contactar Vendedor')]",
            ),
            per_candidate,
        )
        .or_within(
            Locator::xpath("//button[contains(normalize-space(.),'Contactar Vendedor')]"),
            per_candidate,
        )
        .or_within(
            Locator::xpath("//button[.//svg[contains(@class,'lucide-message-circle')]]"),
            per_candidate,
        )
        .or_within(
            Locator::xpath("//*[self::button or self::a][contains(normalize-space(.),'Contactar Vendedor')]"),
            per_candidate,
        )
}

const CHAT_FOOTER: &str = "(//div[contains(@class,'border-t')]//div[contains(@class,'space-x-2')])[last()]";

pub fn chat_input() -> Locator {
    Locator::xpath(format!(
        "{}//input[@data-slot='input' and @placeholder='Escribe un mensaje...']",
        CHAT_FOOTER
    ))
}

/// Any chat input, used to observe it being emptied after sending.
pub fn chat_input_any() -> Locator {
    Locator::xpath(
        "//div[contains(@class,'border-t')]//div[contains(@class,'flex')]\
         //input[@data-slot='input' and @placeholder='Escribe un mensaje...']",
    )
}

pub fn chat_send_button() -> Locator {
    Locator::xpath(format!(
        "{}//button[@data-slot='button' and .//svg[contains(@class,'lucide-send')]]",
        CHAT_FOOTER
    ))
}

/// Finds the send button of the last chat footer; returns null when absent.
pub const CHAT_SEND_BUTTON_SCRIPT: &str = r#"const footers = document.querySelectorAll('div.border-t div.flex.space-x-2');
if (!footers.length) { return null; }
const footer = footers[footers.length - 1];
const buttons = footer.querySelectorAll('button[data-slot="button"]');
for (const b of buttons) {
  if (b.querySelector('svg.lucide-send')) { return b; }
}
return null;"#;

pub fn message_toast() -> Locator {
    Locator::xpath(
        "//*[contains(normalize-space(),'Mensaje enviado') or contains(normalize-space(),'enviado') \
         or contains(normalize-space(),'Mensaje')]",
    )
}

// ============================================================================
// Profile
// ============================================================================

pub fn user_menu_trigger() -> Locator {
    Locator::css("button[data-slot='dropdown-menu-trigger']")
}

pub fn open_menu() -> Locator {
    Locator::css("[role='menu']")
}

pub fn settings_menu_item() -> Locator {
    Locator::xpath("//div[@role='menuitem'][contains(., 'Configuración')]")
}

/// First input following the label with this text.
pub fn input_after_label(label: &str) -> Locator {
    Locator::xpath(format!("//label[contains(., {})]/following::input[1]", xpath_literal(label)))
}

pub fn save_profile_button() -> Locator {
    Locator::xpath("//button[normalize-space()='Guardar cambios']")
}

pub fn profile_toast() -> Locator {
    Locator::xpath(
        "//div[contains(., 'perfil actualizado') or contains(., 'Actualizado') \
         or contains(., 'cambios guardados')]",
    )
}

// ============================================================================
// Seller products
// ============================================================================

pub fn heading(text: &str) -> Locator {
    Locator::xpath(format!("//h1[contains(text(), {})]", xpath_literal(text)))
}

pub fn category_trigger() -> Locator {
    Locator::xpath("//label[@for='category']/following-sibling::button")
}

pub fn category_option(label: &str) -> Locator {
    Locator::xpath(format!("//div[@role='option' and text()={0} or .={0}]", xpath_literal(label)))
}

pub fn status_filter_trigger() -> Locator {
    Locator::css("button[data-slot='select-trigger']")
}

pub fn option_containing(text: &str) -> Locator {
    Locator::xpath(format!("//div[@role='option'][contains(., {})]", xpath_literal(text)))
}

pub fn search_button() -> Locator {
    Locator::xpath("//button[normalize-space()='Buscar']")
}

pub fn name_filter() -> Locator {
    Locator::xpath("//input[@placeholder='Nombre del producto...']")
}

pub fn products_table() -> Locator {
    Locator::tag("table")
}

pub fn row_menu_trigger() -> Locator {
    Locator::css("table button[data-slot='dropdown-menu-trigger']")
}

pub fn edit_menu_item() -> Locator {
    Locator::xpath("//a[@role='menuitem'][contains(., 'Editar')]")
}

pub fn mark_sold_menu_item() -> Locator {
    Locator::xpath("//div[@role='menuitem'][contains(., 'Marcar vendido')]")
}

pub fn product_updated_toast() -> Locator {
    Locator::xpath("//div[normalize-space()='Producto actualizado exitosamente']")
}

pub fn marked_sold_toast() -> Locator {
    Locator::xpath(
        "//div[contains(., 'Producto marcado como vendido') \
         or contains(., 'Producto actualizado exitosamente') or contains(., 'Actualizado')]",
    )
}

pub fn table_row_named(name: &str) -> Locator {
    Locator::xpath(format!("//table//p[normalize-space()={}]", xpath_literal(name)))
}

// ============================================================================
// Registration
// ============================================================================

pub fn register_card() -> Locator {
    Locator::xpath(
        "//div[@class='w-full max-w-md']//div[@data-slot='card' \
         and .//div[@data-slot='card-title' and contains(normalize-space(),'Crear Cuenta')]]",
    )
}

pub fn role_trigger() -> Locator {
    Locator::xpath(
        "//button[@role='combobox' and @data-slot='select-trigger' \
         and .//span[contains(normalize-space(),'Selecciona tu rol')]]",
    )
}

pub fn role_option(role: &str, per_candidate: Duration) -> CandidateList {
    CandidateList::new("role option")
        .or_within(
            Locator::xpath(format!(
                "//*[@data-slot='select-item' or @role='option'][contains(normalize-space(),{}) \
                 or contains(normalize-space(),'buyer')]",
                xpath_literal(role)
            )),
            per_candidate,
        )
        .or_within(
            Locator::xpath("//*[@data-slot='select-item' or @role='option'][1]"),
            per_candidate,
        )
}

pub fn register_submit() -> Locator {
    Locator::xpath("//form//button[@type='submit' and contains(normalize-space(),'Crear Cuenta')]")
}

pub fn register_success() -> Locator {
    Locator::xpath(
        "//*[@data-sonner-toast or @role='status' or contains(@class,'sonner') \
         or contains(normalize-space(),'Registro') or contains(normalize-space(),'éxito')]",
    )
}

pub fn error_alert() -> Locator {
    Locator::xpath("//*[@role='alert' or contains(@class,'error')]")
}
