use std::collections::HashSet;

use tracing::{info, warn};

use crate::browser::protocol::ElementRef;
use crate::error::{E2eError, E2eResult};
use crate::interact::executor::{Action, ActionMode};
use crate::interact::poller::Condition;
use crate::interact::resolver::Actionability;
use crate::scenario::context::ScenarioContext;
use crate::scenario::locators::{
    card_title, favorite_button, favorite_toast, nav_favorites, nav_products, page_body,
    product_card, product_grid, unfavorite_button, ROUTE_FAVORITES, ROUTE_PRODUCTS,
};

/// Failures that only cost us the current card, not the scenario.
fn is_card_local(err: &E2eError) -> bool {
    matches!(
        err,
        E2eError::LocatorExhausted { .. } | E2eError::Interaction { .. } | E2eError::ConditionTimeout { .. }
    ) || err.is_transient()
}

pub fn open_favorites(ctx: &mut ScenarioContext<'_>) -> E2eResult<()> {
    let link = ctx.resolve(&nav_favorites(), Actionability::Clickable)?;
    ctx.click(&link)?;
    ctx.wait_for(Condition::UrlContains(ROUTE_FAVORITES.to_string()))?;
    ctx.wait_for(Condition::Present(page_body()))?;
    Ok(())
}

pub fn open_products(ctx: &mut ScenarioContext<'_>) -> E2eResult<()> {
    let link = ctx.resolve(&nav_products(), Actionability::Clickable)?;
    ctx.click(&link)?;
    ctx.wait_for(Condition::UrlContains(ROUTE_PRODUCTS.to_string()))?;
    ctx.wait_for(Condition::Present(product_grid()))?;
    Ok(())
}

/// Trimmed title of a card, `None` when it has no non-empty title.
fn title_of(ctx: &mut ScenarioContext<'_>, card: &ElementRef) -> E2eResult<Option<String>> {
    let titles = ctx.browser().find_all_within(card, &card_title())?;
    let Some(title) = titles.first() else {
        return Ok(None);
    };
    let text = ctx.browser().text(title)?;
    let text = text.trim();
    Ok((!text.is_empty()).then(|| text.to_string()))
}

/// Titles of every card currently rendered.
fn card_titles(ctx: &mut ScenarioContext<'_>) -> E2eResult<Vec<String>> {
    let cards = ctx.browser().find_all(&product_card())?;
    let mut titles = Vec::with_capacity(cards.len());
    for card in &cards {
        match title_of(ctx, card) {
            Ok(Some(title)) => titles.push(title),
            Ok(None) => {}
            Err(e) if e.is_transient() => {}
            Err(e) => return Err(e),
        }
    }
    Ok(titles)
}

/// Forced click on a heart toggle, confirmed by the toast. When the toast does
/// not show up the click is repeated once natively. Returns whether the toast
/// was eventually seen.
fn toggle_favorite(ctx: &mut ScenarioContext<'_>, heart: &ElementRef) -> E2eResult<bool> {
    ctx.force_click(heart)?;
    if ctx.observe_toast("favorite toast", favorite_toast())? {
        return Ok(true);
    }
    ctx.act(heart, Action::Click, ActionMode::Standard)?;
    ctx.observe_toast("favorite toast after retry", favorite_toast())
}

/// Favorite up to `favorites_target` products that are not favorites yet and
/// check that they are listed on `/favorites`.
pub fn add(ctx: &mut ScenarioContext<'_>) -> E2eResult<()> {
    let wanted = ctx.fixture.favorites_target;

    ctx.step("collect existing favorites");
    open_favorites(ctx)?;
    let initial = ctx.count(&product_card())?;
    let existing: HashSet<String> = card_titles(ctx)?.into_iter().collect();
    info!(count = initial, "existing favorites");

    ctx.step("open products");
    open_products(ctx)?;
    ctx.wait_for(Condition::Present(product_card()))?;
    let total = ctx.count(&product_card())?;
    ctx.ensure("product cards listed", total > 0, || "no product cards found".to_string())?;

    ctx.step("mark favorites");
    let mut added: Vec<String> = Vec::new();
    let mut index = 0;
    while index < total && added.len() < wanted {
        // The grid re-renders after every toggle; never reuse old card handles
        let cards = ctx.browser().find_all(&product_card())?;
        let Some(card) = cards.get(index).cloned() else {
            break;
        };
        index += 1;

        let title = match title_of(ctx, &card) {
            Ok(Some(title)) => title,
            Ok(None) => continue,
            Err(e) if e.is_transient() => continue,
            Err(e) => return Err(e),
        };
        if existing.contains(&title) || added.contains(&title) {
            continue;
        }

        let heart = match ctx.resolve_within(&card, &favorite_button(), Actionability::Present) {
            Ok(heart) => heart,
            Err(e) if is_card_local(&e) => {
                warn!(title = %title, error = %e, "no favorite button on card");
                continue;
            }
            Err(e) => return Err(e),
        };

        match toggle_favorite(ctx, &heart) {
            Ok(true) => {
                info!(title = %title, "added to favorites");
                added.push(title);
            }
            Ok(false) => warn!(title = %title, "favorite toggle not confirmed"),
            Err(e) if is_card_local(&e) => {
                warn!(title = %title, error = %e, "could not favorite product");
            }
            Err(e) => return Err(e),
        }
    }

    ctx.ensure("new favorites added", !added.is_empty(), || {
        "no product could be added; all listed products may already be favorites".to_string()
    })?;

    ctx.step("verify favorites");
    open_favorites(ctx)?;
    let target = initial + added.len();
    let reached = match ctx.wait_for(Condition::CountAtLeast(product_card(), target)) {
        Ok(_) => true,
        Err(E2eError::ConditionTimeout { .. }) => false,
        Err(e) => return Err(e),
    };
    let current = ctx.count(&product_card())?;
    ctx.ensure("favorites count grew", reached, || {
        format!("{} favorites, expected at least {}", current, target)
    })?;

    let listed = card_titles(ctx)?;
    let missing: Vec<&String> = added.iter().filter(|t| !listed.contains(t)).collect();
    ctx.ensure("added products listed", missing.is_empty(), || {
        let names: Vec<&str> = missing.iter().map(|s| s.as_str()).collect();
        format!("not on /favorites: {}", names.join(", "))
    })
}

/// Wait until fewer than `before` cards are rendered.
fn count_dropped(ctx: &mut ScenarioContext<'_>, before: usize) -> E2eResult<bool> {
    match ctx.wait_for(Condition::CountBelow(product_card(), before)) {
        Ok(_) => Ok(true),
        Err(E2eError::ConditionTimeout { .. }) => Ok(false),
        Err(e) => Err(e),
    }
}

/// One forced re-click on the first card's heart-off button.
fn retry_removal(ctx: &mut ScenarioContext<'_>) -> E2eResult<()> {
    let Some(card) = ctx.browser().find_first(&product_card())? else {
        return Ok(());
    };
    let button = ctx.resolve_within(&card, &unfavorite_button(), Actionability::Present)?;
    ctx.force_click(&button)
}

/// Remove favorites one by one, always taking the first card, and check that
/// the list shrank.
pub fn remove(ctx: &mut ScenarioContext<'_>) -> E2eResult<()> {
    ctx.step("open favorites");
    open_favorites(ctx)?;
    ctx.wait_for(Condition::Present(product_grid()))?;

    let initial = ctx.count(&product_card())?;
    ctx.ensure("favorites to remove", initial >= 1, || "no favorites listed".to_string())?;

    ctx.step("remove favorites");
    let mut removed = 0;
    for attempt in 0..initial {
        let cards = ctx.browser().find_all(&product_card())?;
        let Some(card) = cards.first().cloned() else {
            break;
        };
        let before = cards.len();
        let title = title_of(ctx, &card)
            .ok()
            .flatten()
            .unwrap_or_else(|| format!("card-{}", attempt + 1));

        let button = match ctx.resolve_within(&card, &unfavorite_button(), Actionability::Present) {
            Ok(button) => button,
            Err(e) if is_card_local(&e) => {
                warn!(title = %title, error = %e, "no unfavorite button on card");
                continue;
            }
            Err(e) => return Err(e),
        };

        ctx.force_click(&button)?;
        ctx.observe_toast("favorite removed toast", favorite_toast())?;

        let mut dropped = count_dropped(ctx, before)?;
        if !dropped {
            match retry_removal(ctx) {
                Ok(()) => dropped = count_dropped(ctx, before)?,
                Err(e) if is_card_local(&e) => warn!(title = %title, error = %e, "retry failed"),
                Err(e) => return Err(e),
            }
        }

        let after = ctx.count(&product_card())?;
        ctx.ensure("favorite removal shrinks list", !dropped || after < before, || {
            format!("count went from {} to {}", before, after)
        })?;
        if dropped {
            removed += 1;
            info!(title = %title, remaining = after, "removed from favorites");
        } else {
            warn!(title = %title, "favorite count did not drop");
        }
    }

    ctx.settle();
    let remaining = ctx.count(&product_card())?;
    info!(removed, remaining, "favorites removed");
    ctx.ensure("favorites decreased", remaining < initial, || {
        format!("initial={}, final={}", initial, remaining)
    })
}
