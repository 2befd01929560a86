//! Role-derived navigation: the link bar, the account dropdown and the search toggle.

use shared::domain::Role;

use crate::session::Session;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum IconTag {
    Home,
    Users,
    MessageCircle,
    LayoutDashboard,
    Building,
    User,
    Settings,
    LogIn,
    UserPlus,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct MenuEntry {
    pub label: &'static str,
    pub destination: &'static str,
    pub icon: IconTag,
}

const fn entry(label: &'static str, destination: &'static str, icon: IconTag) -> MenuEntry {
    MenuEntry {
        label,
        destination,
        icon,
    }
}

const BASE_ENTRIES: [MenuEntry; 3] = [
    entry("Find Rooms", "/rooms", IconTag::Home),
    entry("Find Roommates", "/roommates", IconTag::Users),
    entry("Messages", "/messages", IconTag::MessageCircle),
];

const ADMIN_ENTRIES: [MenuEntry; 2] = [
    entry("Dashboard", "/admin/dashboard", IconTag::LayoutDashboard),
    entry("Manage Properties", "/admin/properties", IconTag::Building),
];

const GUEST_ENTRIES: [MenuEntry; 2] = [
    entry("Login", "/login", IconTag::LogIn),
    entry("Sign Up", "/signup", IconTag::UserPlus),
];

/// Entries shown in the link bar for `role`. Admins get the member entries followed by the
/// admin-only ones.
pub fn visible_menu(role: Role) -> Vec<MenuEntry> {
    match role {
        Role::Guest => GUEST_ENTRIES.to_vec(),
        Role::Member => BASE_ENTRIES.to_vec(),
        Role::Admin => BASE_ENTRIES.iter().chain(&ADMIN_ENTRIES).copied().collect(),
    }
}

pub fn admin_only_entries() -> &'static [MenuEntry] {
    &ADMIN_ENTRIES
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct AccountAction {
    pub label: &'static str,
    pub icon: Option<IconTag>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AccountMenu {
    pub heading: &'static str,
    /// Groups are rendered with a separator between them.
    pub groups: Vec<Vec<AccountAction>>,
}

impl AccountMenu {
    pub fn labels(&self) -> Vec<&'static str> {
        self.groups
            .iter()
            .flatten()
            .map(|action| action.label)
            .collect()
    }
}

/// Dropdown behind the account button. Guests have no account menu.
pub fn account_menu(role: Role) -> Option<AccountMenu> {
    let action = |label, icon| AccountAction { label, icon };
    let mut groups = vec![vec![
        action("Profile", Some(IconTag::User)),
        action("Settings", Some(IconTag::Settings)),
    ]];
    let heading = match role {
        Role::Guest => return None,
        Role::Member => "User Menu",
        Role::Admin => {
            groups.push(vec![
                action("Admin Dashboard", Some(IconTag::LayoutDashboard)),
                action("Manage Properties", Some(IconTag::Building)),
            ]);
            "Admin Menu"
        }
    };
    groups.push(vec![action("Log out", None)]);
    Some(AccountMenu { heading, groups })
}

/// Open/closed state of the search affordance. Local to the bar, never persisted.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct SearchBox {
    open: bool,
}

impl SearchBox {
    pub fn is_open(self) -> bool {
        self.open
    }

    pub fn toggle(&mut self) {
        self.open = !self.open;
    }

    pub fn blur(&mut self) {
        self.open = false;
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Presentation {
    /// Inline link bar.
    Desktop,
    /// Slide-out panel.
    Mobile,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct NavLink {
    pub entry: MenuEntry,
    pub active: bool,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NavView {
    pub presentation: Presentation,
    pub links: Vec<NavLink>,
    pub account: Option<AccountMenu>,
    pub show_search: bool,
    pub search_open: bool,
}

impl NavView {
    pub fn entries(&self) -> Vec<MenuEntry> {
        self.links.iter().map(|link| link.entry).collect()
    }
}

pub struct NavigationController {
    session: Session,
    search: SearchBox,
}

impl NavigationController {
    pub fn new(session: Session) -> Self {
        Self {
            session,
            search: SearchBox::default(),
        }
    }

    pub async fn menu(&self) -> Vec<MenuEntry> {
        visible_menu(self.session.role().await)
    }

    pub async fn render(&self, presentation: Presentation, current_path: &str) -> NavView {
        let role = self.session.role().await;
        let links = visible_menu(role)
            .into_iter()
            .map(|entry| NavLink {
                entry,
                active: entry.destination == current_path,
            })
            .collect();
        NavView {
            presentation,
            links,
            account: account_menu(role),
            show_search: role.is_signed_in(),
            search_open: role.is_signed_in() && self.search.is_open(),
        }
    }

    pub fn toggle_search(&mut self) {
        self.search.toggle();
    }

    pub fn search_blurred(&mut self) {
        self.search.blur();
    }

    pub fn search_open(&self) -> bool {
        self.search.is_open()
    }
}

#[cfg(test)]
#[path = "tests/navigation_tests.rs"]
mod tests;
