//! Wiring the settings page into a host admin UI.
//!
//! The host owns menus, pages and permission checks. `Plugin::init` only
//! tells it, through an `AdminRegistrar`, which setting to register, which
//! page to add and which action link to show.

use crate::settings::bundle_id;

/// Capability an admin needs to open the settings page.
pub const MANAGE_OPTIONS: &str = "manage_options";

/// Host callbacks invoked once at startup.
pub trait AdminRegistrar {
    /// Register `bundle_id` as a setting whose submissions go through
    /// `SettingsStore::save`.
    fn register_setting(&mut self, bundle_id: &str);

    fn add_options_page(&mut self, page_title: &str, menu_title: &str, capability: &str, slug: &str);

    /// Prepend `html` to the component's action links.
    fn add_action_link(&mut self, html: &str);
}

/// Identity of the component in the admin UI.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Plugin {
    display_name: String,
    bundle_id: String,
}

impl Plugin {
    /// `name` is the component's file or human-readable name; `class_name`
    /// becomes the display name with underscores turned into spaces.
    pub fn new(name: &str, class_name: &str) -> Self {
        Self {
            display_name: class_name.replace('_', " "),
            bundle_id: bundle_id(name),
        }
    }

    pub fn display_name(&self) -> &str {
        &self.display_name
    }

    pub fn bundle_id(&self) -> &str {
        &self.bundle_id
    }

    /// Link to the settings page, as shown next to the component.
    pub fn settings_link(&self) -> String {
        format!(
            "<a href=\"options-general.php?page={}\">Settings</a>",
            self.bundle_id
        )
    }

    pub fn init<R: AdminRegistrar + ?Sized>(&self, registrar: &mut R) {
        registrar.add_action_link(&self.settings_link());
        registrar.register_setting(&self.bundle_id);
        registrar.add_options_page(
            &self.display_name,
            &self.display_name,
            MANAGE_OPTIONS,
            &self.bundle_id,
        );
    }
}
