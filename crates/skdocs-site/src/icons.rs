//! Category icons.

/// Icon shown for categories without a dedicated one.
pub const FALLBACK_ICON: &str = "fa-check";

/// Font Awesome icon for a category (name without order prefix).
#[must_use]
pub fn icon_for(category: &str) -> &'static str {
    match category {
        "Community" => "fa-users",
        "Developers" => "fa-code",
        "Get_Started" => "fa-rocket-launch",
        "Operations" => "fa-gear",
        "Operator" => "fa-user-crown",
        "Parties" => "fa-user-group-crown",
        "Plans" => "fa-gem",
        "Products" => "fa-conveyor-belt",
        _ => FALLBACK_ICON,
    }
}
