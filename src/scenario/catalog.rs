use std::fmt;

use serde::Serialize;

use crate::error::{E2eError, E2eResult};
use crate::scenario::context::ScenarioContext;
use crate::scenario::fixture::Account;
use crate::scenario::locators::{ROUTE_CHAT, ROUTE_DASHBOARD, ROUTE_FAVORITES, ROUTE_MY_PRODUCTS, ROUTE_PRODUCT_DETAIL};
use crate::scenario::{favorites, login, messaging, products, profile, register, report};

/// Every scenario the suite knows, in execution order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "kebab-case")]
pub enum Scenario {
    Login,
    AddFavorites,
    RemoveFavorites,
    EditProfile,
    SendMessage,
    ReportProduct,
    CreateProduct,
    EditProduct,
    MarkSold,
    Register,
}

impl Scenario {
    pub const ALL: [Scenario; 10] = [
        Scenario::Login,
        Scenario::AddFavorites,
        Scenario::RemoveFavorites,
        Scenario::EditProfile,
        Scenario::SendMessage,
        Scenario::ReportProduct,
        Scenario::CreateProduct,
        Scenario::EditProduct,
        Scenario::MarkSold,
        Scenario::Register,
    ];

    pub fn name(&self) -> &'static str {
        match self {
            Scenario::Login => "login",
            Scenario::AddFavorites => "add-favorites",
            Scenario::RemoveFavorites => "remove-favorites",
            Scenario::EditProfile => "edit-profile",
            Scenario::SendMessage => "send-message",
            Scenario::ReportProduct => "report-product",
            Scenario::CreateProduct => "create-product",
            Scenario::EditProduct => "edit-product",
            Scenario::MarkSold => "mark-sold",
            Scenario::Register => "register",
        }
    }

    pub fn description(&self) -> &'static str {
        match self {
            Scenario::Login => "Buyer signs in and lands on the dashboard",
            Scenario::AddFavorites => "Buyer favorites products not yet in favorites",
            Scenario::RemoveFavorites => "Buyer removes favorites until the list shrinks",
            Scenario::EditProfile => "Buyer updates name, phone and address",
            Scenario::SendMessage => "Buyer contacts the seller of the first product",
            Scenario::ReportProduct => "Buyer reports the first product",
            Scenario::CreateProduct => "Seller publishes a new product",
            Scenario::EditProduct => "Seller edits the first active product",
            Scenario::MarkSold => "Seller marks the first active product as sold",
            Scenario::Register => "Visitor signs up with a fresh email",
        }
    }

    pub fn account(&self) -> Account {
        match self {
            Scenario::Login
            | Scenario::AddFavorites
            | Scenario::RemoveFavorites
            | Scenario::EditProfile
            | Scenario::SendMessage
            | Scenario::ReportProduct => Account::Buyer,
            Scenario::CreateProduct | Scenario::EditProduct | Scenario::MarkSold => Account::Seller,
            Scenario::Register => Account::Anonymous,
        }
    }

    /// Route the browser must be on when the scenario ends.
    pub fn target_route(&self) -> &'static str {
        match self {
            Scenario::Login | Scenario::EditProfile | Scenario::Register => ROUTE_DASHBOARD,
            Scenario::AddFavorites | Scenario::RemoveFavorites => ROUTE_FAVORITES,
            Scenario::SendMessage => ROUTE_CHAT,
            Scenario::ReportProduct => ROUTE_PRODUCT_DETAIL,
            Scenario::CreateProduct | Scenario::EditProduct | Scenario::MarkSold => ROUTE_MY_PRODUCTS,
        }
    }

    pub fn from_name(name: &str) -> E2eResult<Scenario> {
        Scenario::ALL
            .iter()
            .copied()
            .find(|s| s.name() == name)
            .ok_or_else(|| E2eError::UnknownScenario(name.to_string()))
    }

    /// Sign in with the scenario's account, then run its journey.
    pub fn execute(&self, ctx: &mut ScenarioContext<'_>) -> E2eResult<()> {
        let fixture = ctx.fixture;
        if let Some(credentials) = fixture.credentials(self.account()) {
            login::sign_in(ctx, credentials)?;
        }

        match self {
            Scenario::Login => login::run(ctx),
            Scenario::AddFavorites => favorites::add(ctx),
            Scenario::RemoveFavorites => favorites::remove(ctx),
            Scenario::EditProfile => profile::run(ctx),
            Scenario::SendMessage => messaging::run(ctx),
            Scenario::ReportProduct => report::run(ctx),
            Scenario::CreateProduct => products::create(ctx),
            Scenario::EditProduct => products::edit(ctx),
            Scenario::MarkSold => products::mark_sold(ctx),
            Scenario::Register => register::run(ctx),
        }
    }
}

impl fmt::Display for Scenario {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}
