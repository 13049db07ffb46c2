use time::{OffsetDateTime, UtcOffset, macros::format_description};
use url::Url;

use crate::{
    domain::keys::{KeyRecord, KeyWithRelations, RefillInterval},
    presentation::keys::{
        BreadcrumbView, DeletePanelView, EnabledPanelView, ExpirationPanelView, KeyNavbarView,
        KeySettingsView, MetadataPanelView, RatelimitPanelView, RefillOptionView,
        RemainingPanelView, TextFieldPanelView,
    },
};

use super::handlers::KeySettingsParams;

const DASHBOARD_BASE: &str = "http://dashboard.local/";

/// Joins `segments` into an absolute path, percent-encoding each segment.
pub(super) fn dashboard_path<'a>(segments: impl IntoIterator<Item = &'a str>) -> String {
    let Ok(mut url) = Url::parse(DASHBOARD_BASE) else {
        return String::from("/");
    };
    if let Ok(mut path) = url.path_segments_mut() {
        path.clear().extend(segments);
    }
    url.path().to_string()
}

/// Builds the settings page for a key the caller is allowed to see.
///
/// Links derived from the record use the stored `keyAuth` and API ids, while the
/// back link echoes the route parameters as they were requested.
pub fn build_settings_view(
    params: &KeySettingsParams,
    record: &KeyWithRelations,
    now: OffsetDateTime,
) -> KeySettingsView {
    let key = &record.key;
    let api = &record.key_auth.api;
    let key_auth_id = record.key_auth.id.as_str();

    let key_href = dashboard_path([
        "apis",
        params.api_id.as_str(),
        "keys",
        key_auth_id,
        key.id.as_str(),
    ]);
    let breadcrumbs = vec![
        BreadcrumbView::link("APIs", dashboard_path(["apis"])),
        BreadcrumbView::link(&api.name, dashboard_path(["apis", params.api_id.as_str()]))
            .identifier(),
        BreadcrumbView::ellipsis(),
        BreadcrumbView::link(&key.id, key_href).identifier(),
        BreadcrumbView::link(
            "Settings",
            dashboard_path([
                "apis",
                params.api_id.as_str(),
                "keys",
                key_auth_id,
                key.id.as_str(),
                "settings",
            ]),
        )
        .active(),
    ];

    let navbar = KeyNavbarView {
        breadcrumbs,
        key_id: key.id.clone(),
        create_key_href: dashboard_path(["apis", api.id.as_str(), "keys", key_auth_id, "new"]),
    };

    KeySettingsView {
        navbar,
        back_href: dashboard_path([
            "apis",
            params.api_id.as_str(),
            "keys",
            params.key_auth_id.as_str(),
            params.key_id.as_str(),
        ]),
        key_id: key.id.clone(),
        enabled: EnabledPanelView {
            action: key_action(key, "enabled"),
            enabled: key.enabled,
        },
        remaining: remaining_panel(key),
        ratelimit: ratelimit_panel(key),
        expiration: expiration_panel(key, now),
        metadata: metadata_panel(key),
        name: TextFieldPanelView {
            title: "Name".to_string(),
            description: "To make it easier to identify a particular key, you can provide a name."
                .to_string(),
            action: key_action(key, "name"),
            field: "name".to_string(),
            value: key.name.clone().unwrap_or_default(),
            placeholder: "my-key".to_string(),
        },
        owner_id: TextFieldPanelView {
            title: "Owner ID".to_string(),
            description: "Use this to associate the key with one of your own users or entities."
                .to_string(),
            action: key_action(key, "owner-id"),
            field: "owner_id".to_string(),
            value: key.owner_id.clone().unwrap_or_default(),
            placeholder: "user_123".to_string(),
        },
        delete: DeletePanelView {
            action: key_action(key, "delete"),
            key_auth_id: key_auth_id.to_string(),
            redirect_href: dashboard_path(["apis", params.api_id.as_str(), "keys", key_auth_id]),
        },
    }
}

fn key_action(key: &KeyRecord, action: &str) -> String {
    dashboard_path(["keys", key.id.as_str(), action])
}

fn remaining_panel(key: &KeyRecord) -> RemainingPanelView {
    let selected = key.refill.map(|refill| refill.interval);
    let mut refill_options = vec![RefillOptionView {
        value: String::new(),
        label: "None".to_string(),
        selected: selected.is_none(),
    }];
    refill_options.extend(RefillInterval::all().iter().map(|interval| RefillOptionView {
        value: interval.as_str().to_string(),
        label: interval.display_name().to_string(),
        selected: selected == Some(*interval),
    }));

    RemainingPanelView {
        action: key_action(key, "remaining"),
        limited: key.remaining.is_some(),
        remaining: key.remaining.map(|value| value.to_string()).unwrap_or_default(),
        refill_options,
        refill_amount: key
            .refill
            .map(|refill| refill.amount.to_string())
            .unwrap_or_default(),
    }
}

fn ratelimit_panel(key: &KeyRecord) -> RatelimitPanelView {
    let ratelimit = key.ratelimit;
    RatelimitPanelView {
        action: key_action(key, "ratelimit"),
        enabled: ratelimit.is_some(),
        asynchronous: ratelimit.is_some_and(|limit| limit.asynchronous),
        limit: ratelimit
            .map(|limit| limit.limit.to_string())
            .unwrap_or_else(|| "10".to_string()),
        duration_ms: ratelimit
            .map(|limit| limit.duration_ms.to_string())
            .unwrap_or_else(|| "1000".to_string()),
    }
}

fn expiration_panel(key: &KeyRecord, now: OffsetDateTime) -> ExpirationPanelView {
    let input_format = format_description!("[year]-[month]-[day]T[hour]:[minute]");
    let label_format = format_description!("[year]-[month]-[day] [hour]:[minute] UTC");

    match key.expires.map(|expires| expires.to_offset(UtcOffset::UTC)) {
        Some(expires) => {
            let is_expired = key.is_expired_at(now);
            let when = expires.format(label_format).unwrap_or_default();
            ExpirationPanelView {
                action: key_action(key, "expiration"),
                has_expiration: true,
                expires_input: expires.format(input_format).unwrap_or_default(),
                expires_label: if is_expired {
                    format!("Expired {when}")
                } else {
                    format!("Expires {when}")
                },
                is_expired,
            }
        }
        None => ExpirationPanelView {
            action: key_action(key, "expiration"),
            has_expiration: false,
            expires_input: String::new(),
            expires_label: "Never expires".to_string(),
            is_expired: false,
        },
    }
}

fn metadata_panel(key: &KeyRecord) -> MetadataPanelView {
    let (document, is_valid_json) = match key.meta.as_deref() {
        None => ("{}".to_string(), true),
        Some(raw) => match serde_json::from_str::<serde_json::Value>(raw)
            .and_then(|value| serde_json::to_string_pretty(&value))
        {
            Ok(pretty) => (pretty, true),
            Err(_) => (raw.to_string(), false),
        },
    };

    MetadataPanelView {
        action: key_action(key, "metadata"),
        document,
        is_valid_json,
    }
}
