use serde::{Deserialize, Serialize};

/// Test data injected into every scenario.
///
/// The accounts are real, shared accounts on the application under test.
/// Two runs that use the same account at the same time interfere with each
/// other (favorites, products and profile are mutated), so suites sharing an
/// account must not run concurrently.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Fixture {
    /// Root of the application under test, without trailing slash
    pub base_url: String,
    pub accounts: Accounts,
    pub product: ProductDraft,
    pub product_edit: ProductEdit,
    pub profile: ProfileData,
    pub registration: Registration,
    pub message: String,
    pub report_comment: String,
    /// How many products `add-favorites` tries to favorite
    pub favorites_target: usize,
}

impl Default for Fixture {
    fn default() -> Self {
        Self {
            base_url: "http://localhost:5173".to_string(),
            accounts: Accounts::default(),
            product: ProductDraft::default(),
            product_edit: ProductEdit::default(),
            profile: ProfileData::default(),
            registration: Registration::default(),
            message: "Hola, estoy interesado en este producto. ¿Sigue disponible?".to_string(),
            report_comment: "Este producto incumple las políticas. Favor revisar.".to_string(),
            favorites_target: 3,
        }
    }
}

impl Fixture {
    /// Absolute URL for an application route.
    pub fn url(&self, route: &str) -> String {
        format!("{}{}", self.base_url.trim_end_matches('/'), route)
    }

    pub fn credentials(&self, account: Account) -> Option<&Credentials> {
        match account {
            Account::Buyer => Some(&self.accounts.buyer),
            Account::Seller => Some(&self.accounts.seller),
            Account::Anonymous => None,
        }
    }
}

/// Which account a scenario signs in with.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Account {
    Buyer,
    Seller,
    /// No sign-in
    Anonymous,
}

impl std::fmt::Display for Account {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let name = match self {
            Account::Buyer => "buyer",
            Account::Seller => "seller",
            Account::Anonymous => "-",
        };
        f.write_str(name)
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Credentials {
    pub email: String,
    pub password: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Accounts {
    pub buyer: Credentials,
    pub seller: Credentials,
}

impl Default for Accounts {
    fn default() -> Self {
        Self {
            buyer: Credentials {
                email: "juan@gmail.com".to_string(),
                password: "14052003@leX".to_string(),
            },
            seller: Credentials {
                email: "alexflakito15@gmail.com".to_string(),
                password: "14052003@leX".to_string(),
            },
        }
    }
}

/// Values for the create-product form.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ProductDraft {
    pub name: String,
    pub description: String,
    pub price: String,
    pub location: String,
    /// Visible label of the category option
    pub category: String,
}

impl Default for ProductDraft {
    fn default() -> Self {
        Self {
            name: "Tablet de prueba".to_string(),
            description: "Tablet nueva agregada desde Selenium".to_string(),
            price: "120".to_string(),
            location: "Quito".to_string(),
            category: "Hogar".to_string(),
        }
    }
}

/// Replacement values for the edit-product form.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ProductEdit {
    pub name: String,
    pub description: String,
    pub price: String,
}

impl Default for ProductEdit {
    fn default() -> Self {
        Self {
            name: "Cama Selenium Editada".to_string(),
            description: "Cama nueva actualizada desde Selenium".to_string(),
            price: "50".to_string(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ProfileData {
    pub first_name: String,
    pub last_name: String,
    pub phone: String,
    pub address: String,
}

impl Default for ProfileData {
    fn default() -> Self {
        Self {
            first_name: "maria".to_string(),
            last_name: "sss".to_string(),
            phone: "0101001010".to_string(),
            address: "Calle Falsa 123".to_string(),
        }
    }
}

/// Sign-up data. `email_template` must contain `{ts}`, replaced by the
/// current unix time so that every run registers a fresh address.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Registration {
    pub first_name: String,
    pub last_name: String,
    pub national_id: String,
    pub email_template: String,
    pub phone: String,
    pub address: String,
    /// Label of the preferred role option
    pub role: String,
    pub password: String,
}

impl Default for Registration {
    fn default() -> Self {
        Self {
            first_name: "Pedro".to_string(),
            last_name: "Sanchez".to_string(),
            national_id: "14788890".to_string(),
            email_template: "pedrosanchez+{ts}@exfxample.com".to_string(),
            phone: "+593987654321".to_string(),
            address: "Av. Siempre Viva 742".to_string(),
            role: "Comprador".to_string(),
            password: "PruebaSegura#123".to_string(),
        }
    }
}

impl Registration {
    pub fn email_for(&self, unix_seconds: u64) -> String {
        self.email_template.replace("{ts}", &unix_seconds.to_string())
    }
}
