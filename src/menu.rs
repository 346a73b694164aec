//! Navigation menus shown around an item page.

use serde::Serialize;

use crate::db::Item;
use crate::identity::Session;

/// Builds absolute site urls from the configured base url.
#[derive(Debug, Clone)]
pub struct UrlBuilder {
    base_url: String,
}

impl UrlBuilder {
    pub fn new(base_url: impl Into<String>) -> Self {
        let mut base_url = base_url.into();
        if !base_url.ends_with('/') {
            base_url.push('/');
        }
        Self { base_url }
    }

    pub fn base(&self) -> String {
        self.base_url.clone()
    }

    pub fn site(&self, path: &str) -> String {
        format!("{}{}", self.base_url, path.trim_start_matches('/'))
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum MenuElement {
    Link { label: String, url: String },
    /// Opens `url` in a dialog instead of navigating to it.
    Dialog { label: String, url: String },
    Menu(Menu),
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct Menu {
    pub label: String,
    pub elements: Vec<MenuElement>,
}

impl Menu {
    pub fn new(label: impl Into<String>) -> Self {
        Self {
            label: label.into(),
            elements: Vec::new(),
        }
    }

    pub fn append(&mut self, element: MenuElement) -> &mut Self {
        self.elements.push(element);
        self
    }

    pub fn link(label: impl Into<String>, url: String) -> MenuElement {
        MenuElement::Link {
            label: label.into(),
            url,
        }
    }

    pub fn dialog(label: impl Into<String>, url: String) -> MenuElement {
        MenuElement::Dialog {
            label: label.into(),
            url,
        }
    }
}

/// Append the standard menus for `item` to `menu`.
///
/// Upload and admin entries are offered to any logged-in user; whether the
/// user may actually add to or edit `item` is checked by the forms they
/// open, not here.
pub fn core_menu_items(menu: &mut Menu, item: &Item, session: &Session, urls: &UrlBuilder) {
    menu.append(Menu::link("HOME", urls.base()));
    menu.append(Menu::link("BROWSE", urls.site("albums/1")));

    let Some(user) = session.logged_in_user() else {
        return;
    };

    let mut upload = Menu::new("UPLOAD");
    upload.append(Menu::dialog(
        "Add Photos",
        urls.site(&format!("form/add/photos/{}", item.id)),
    ));
    menu.append(MenuElement::Menu(upload));

    let mut admin = Menu::new("ADMIN");
    admin.append(Menu::dialog(
        "Edit Item",
        urls.site(&format!("form/edit/{}s/{}", item.item_type, item.id)),
    ));
    if user.admin {
        admin.append(Menu::link("Site Admin", urls.site("admin")));
    }
    menu.append(MenuElement::Menu(admin));
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db::ROOT_ID;
    use crate::identity::ADMIN_USER_ID;
    use crate::test_support::{album, test_db};

    fn labels(menu: &Menu) -> Vec<String> {
        menu.elements
            .iter()
            .map(|e| match e {
                MenuElement::Link { label, .. } | MenuElement::Dialog { label, .. } => label.clone(),
                MenuElement::Menu(m) => m.label.clone(),
            })
            .collect()
    }

    #[test]
    fn test_guest_gets_navigation_only() {
        let db = test_db();
        let session = Session::new("s", db.guest().unwrap());
        let mut menu = Menu::new("main");

        core_menu_items(&mut menu, &db.root().unwrap(), &session, &UrlBuilder::new("/gallery"));

        assert_eq!(labels(&menu), vec!["HOME", "BROWSE"]);
        assert_eq!(
            menu.elements[1],
            MenuElement::Link {
                label: "BROWSE".to_string(),
                url: "/gallery/albums/1".to_string()
            }
        );
    }

    #[test]
    fn test_registered_user_gets_upload_and_edit() {
        let db = test_db();
        let a = album(&db, ROOT_ID, "a");
        let user = db.create_user("alice", "Alice", false).unwrap();
        let session = Session::new("s", user);
        let mut menu = Menu::new("main");

        core_menu_items(&mut menu, &a, &session, &UrlBuilder::new("/"));

        assert_eq!(labels(&menu), vec!["HOME", "BROWSE", "UPLOAD", "ADMIN"]);
        let MenuElement::Menu(upload) = &menu.elements[2] else {
            panic!("expected upload menu");
        };
        assert_eq!(
            upload.elements,
            vec![Menu::dialog("Add Photos", format!("/form/add/photos/{}", a.id))]
        );
        let MenuElement::Menu(admin) = &menu.elements[3] else {
            panic!("expected admin menu");
        };
        assert_eq!(
            admin.elements,
            vec![Menu::dialog("Edit Item", format!("/form/edit/albums/{}", a.id))]
        );
    }

    #[test]
    fn test_admin_gets_site_admin_link() {
        let db = test_db();
        let session = Session::new("s", db.get_user(ADMIN_USER_ID).unwrap().unwrap());
        let mut menu = Menu::new("main");

        core_menu_items(&mut menu, &db.root().unwrap(), &session, &UrlBuilder::new("http://x/"));

        let MenuElement::Menu(admin) = &menu.elements[3] else {
            panic!("expected admin menu");
        };
        assert_eq!(labels(admin), vec!["Edit Item", "Site Admin"]);
    }

    #[test]
    fn test_menu_serializes_with_type_tag() {
        let json = serde_json::to_value(Menu::link("HOME", "/".to_string())).unwrap();
        assert_eq!(json["type"], "link");
        assert_eq!(json["url"], "/");
    }
}
