use super::*;

use std::{collections::HashSet, sync::Arc, time::Duration};

use async_trait::async_trait;
use shared::domain::{SessionUser, UserId};

use crate::{session::SessionController, CurrentUserSource};

struct FixedUser(Role);

#[async_trait]
impl CurrentUserSource for FixedUser {
    async fn fetch_current_user(&self) -> anyhow::Result<Option<SessionUser>> {
        Ok(Some(SessionUser {
            id: UserId(1),
            display_name: "Dev".to_string(),
            role: self.0,
        }))
    }
}

async fn signed_in(role: Role) -> Session {
    let controller =
        SessionController::new(Session::new(), Arc::new(FixedUser(role)), Duration::from_secs(1));
    controller.initialize().await;
    controller.session().clone()
}

fn labels(entries: &[MenuEntry]) -> Vec<&'static str> {
    entries.iter().map(|entry| entry.label).collect()
}

#[test]
fn guests_see_login_and_sign_up_only() {
    assert_eq!(labels(&visible_menu(Role::Guest)), vec!["Login", "Sign Up"]);
}

#[test]
fn menu_is_deterministic_per_role() {
    for role in [Role::Guest, Role::Member, Role::Admin] {
        assert_eq!(visible_menu(role), visible_menu(role));
    }
}

#[test]
fn admin_menu_is_member_menu_plus_admin_entries() {
    let member = visible_menu(Role::Member);
    let admin = visible_menu(Role::Admin);

    assert_eq!(&admin[..member.len()], member.as_slice());
    assert_eq!(&admin[member.len()..], admin_only_entries());

    let member_set: HashSet<_> = member.iter().collect();
    let extra: Vec<_> = admin.iter().filter(|e| !member_set.contains(e)).collect();
    assert_eq!(extra.len(), admin_only_entries().len());
    assert_eq!(
        labels(admin_only_entries()),
        vec!["Dashboard", "Manage Properties"]
    );
}

#[test]
fn account_menu_follows_role() {
    assert!(account_menu(Role::Guest).is_none());

    let member = account_menu(Role::Member).expect("member menu");
    assert_eq!(member.heading, "User Menu");
    assert_eq!(member.labels(), vec!["Profile", "Settings", "Log out"]);

    let admin = account_menu(Role::Admin).expect("admin menu");
    assert_eq!(admin.heading, "Admin Menu");
    assert_eq!(
        admin.labels(),
        vec![
            "Profile",
            "Settings",
            "Admin Dashboard",
            "Manage Properties",
            "Log out"
        ]
    );
    assert_eq!(admin.groups.len(), 3);
}

#[tokio::test]
async fn desktop_and_mobile_render_the_same_entries() {
    let nav = NavigationController::new(signed_in(Role::Admin).await);
    let desktop = nav.render(Presentation::Desktop, "/rooms").await;
    let mobile = nav.render(Presentation::Mobile, "/rooms").await;

    assert_eq!(desktop.entries(), mobile.entries());
    assert_eq!(desktop.entries(), visible_menu(Role::Admin));
    assert_eq!(mobile.presentation, Presentation::Mobile);
}

#[tokio::test]
async fn current_path_marks_exactly_one_link_active() {
    let nav = NavigationController::new(signed_in(Role::Member).await);
    let view = nav.render(Presentation::Desktop, "/messages").await;
    let active: Vec<_> = view
        .links
        .iter()
        .filter(|link| link.active)
        .map(|link| link.entry.label)
        .collect();
    assert_eq!(active, vec!["Messages"]);
}

#[tokio::test]
async fn menu_recomputes_when_the_session_resolves() {
    let session = Session::new();
    let nav = NavigationController::new(session.clone());
    assert_eq!(nav.menu().await, visible_menu(Role::Guest));

    let controller =
        SessionController::new(session, Arc::new(FixedUser(Role::Admin)), Duration::from_secs(1));
    controller.initialize().await;
    assert_eq!(nav.menu().await, visible_menu(Role::Admin));
}

#[tokio::test]
async fn search_box_opens_closes_and_closes_on_blur() {
    let mut nav = NavigationController::new(signed_in(Role::Member).await);
    assert!(!nav.search_open());

    nav.toggle_search();
    assert!(nav.render(Presentation::Desktop, "/").await.search_open);
    nav.toggle_search();
    assert!(!nav.search_open());

    nav.toggle_search();
    nav.search_blurred();
    assert!(!nav.search_open());
}

#[tokio::test]
async fn guests_get_no_search_or_account_menu() {
    let mut nav = NavigationController::new(Session::new());
    nav.toggle_search();
    let view = nav.render(Presentation::Desktop, "/").await;
    assert!(!view.show_search);
    assert!(!view.search_open);
    assert!(view.account.is_none());
}
