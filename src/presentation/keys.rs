use askama::Template;

use super::views::DashboardLayout;

#[derive(Clone)]
pub struct BreadcrumbView {
    pub label: String,
    pub href: String,
    /// Rendered in a monospace face; ids and API names are identifiers.
    pub is_identifier: bool,
    pub is_active: bool,
    pub is_ellipsis: bool,
}

impl BreadcrumbView {
    pub fn link(label: impl Into<String>, href: impl Into<String>) -> Self {
        Self {
            label: label.into(),
            href: href.into(),
            is_identifier: false,
            is_active: false,
            is_ellipsis: false,
        }
    }

    pub fn identifier(mut self) -> Self {
        self.is_identifier = true;
        self
    }

    pub fn active(mut self) -> Self {
        self.is_active = true;
        self
    }

    pub fn ellipsis() -> Self {
        Self {
            label: "…".to_string(),
            href: String::new(),
            is_identifier: false,
            is_active: false,
            is_ellipsis: true,
        }
    }
}

#[derive(Clone)]
pub struct KeyNavbarView {
    pub breadcrumbs: Vec<BreadcrumbView>,
    pub key_id: String,
    pub create_key_href: String,
}

#[derive(Clone)]
pub struct EnabledPanelView {
    pub action: String,
    pub enabled: bool,
}

#[derive(Clone)]
pub struct RefillOptionView {
    pub value: String,
    pub label: String,
    pub selected: bool,
}

#[derive(Clone)]
pub struct RemainingPanelView {
    pub action: String,
    pub limited: bool,
    pub remaining: String,
    pub refill_options: Vec<RefillOptionView>,
    pub refill_amount: String,
}

#[derive(Clone)]
pub struct RatelimitPanelView {
    pub action: String,
    pub enabled: bool,
    pub asynchronous: bool,
    pub limit: String,
    pub duration_ms: String,
}

#[derive(Clone)]
pub struct ExpirationPanelView {
    pub action: String,
    pub has_expiration: bool,
    /// `datetime-local` input value in UTC, empty when the key never expires.
    pub expires_input: String,
    pub expires_label: String,
    pub is_expired: bool,
}

#[derive(Clone)]
pub struct MetadataPanelView {
    pub action: String,
    pub document: String,
    pub is_valid_json: bool,
}

#[derive(Clone)]
pub struct TextFieldPanelView {
    pub title: String,
    pub description: String,
    pub action: String,
    pub field: String,
    pub value: String,
    pub placeholder: String,
}

#[derive(Clone)]
pub struct DeletePanelView {
    pub action: String,
    pub key_auth_id: String,
    pub redirect_href: String,
}

#[derive(Clone)]
pub struct KeySettingsView {
    pub navbar: KeyNavbarView,
    pub back_href: String,
    pub key_id: String,
    pub enabled: EnabledPanelView,
    pub remaining: RemainingPanelView,
    pub ratelimit: RatelimitPanelView,
    pub expiration: ExpirationPanelView,
    pub metadata: MetadataPanelView,
    pub name: TextFieldPanelView,
    pub owner_id: TextFieldPanelView,
    pub delete: DeletePanelView,
}

#[derive(Template)]
#[template(path = "key_settings.html")]
pub struct KeySettingsTemplate {
    pub view: DashboardLayout<KeySettingsView>,
}
