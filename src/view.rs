//! View state persisted in the URL query string.
//!
//! List screens keep their page, filters and open sheet in the query string
//! so filtered views can be bookmarked and the back button works. Sheet
//! parameters are never carried into generated links: following a link
//! always lands on a closed sheet.

use std::collections::BTreeMap;

use serde::Serialize;

use crate::pagination::{PageRequest, PaginationControl};

pub const PAGE_PARAM: &str = "page";
pub const SHEET_PARAM: &str = "sheet";
pub const EDIT_PARAM: &str = "edit";
pub const DELETE_PARAM: &str = "delete";

/// Which surface the query string asks to open.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub enum SheetRequest {
    #[default]
    None,
    Create,
    Edit(String),
    Delete(String),
}

#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct ViewQuery {
    /// 1-based page number as it appears in the URL.
    pub page: Option<usize>,
    pub filters: BTreeMap<String, String>,
    pub sheet: SheetRequest,
}

impl ViewQuery {
    /// Parses a raw query string, keeping only `allowed_filters` and
    /// dropping empty values. Malformed input yields the default view.
    pub fn parse(query_string: &str, allowed_filters: &[&str]) -> Self {
        let pairs: Vec<(String, String)> =
            serde_html_form::from_str(query_string).unwrap_or_else(|err| {
                log::warn!("Ignoring malformed query string {query_string:?}: {err}");
                Vec::new()
            });

        let mut view = Self::default();
        for (key, value) in pairs {
            let value = value.trim().to_string();
            if value.is_empty() {
                continue;
            }
            match key.as_str() {
                PAGE_PARAM => view.page = value.parse().ok(),
                SHEET_PARAM if value == "create" => view.sheet = SheetRequest::Create,
                EDIT_PARAM => view.sheet = SheetRequest::Edit(value),
                DELETE_PARAM => view.sheet = SheetRequest::Delete(value),
                other if allowed_filters.contains(&other) => {
                    view.filters.insert(key, value);
                }
                _ => {}
            }
        }
        view
    }

    pub fn page_request(&self, size: usize) -> PageRequest {
        PageRequest::from_display(self.page, size)
    }

    fn encode(pairs: &[(&str, String)]) -> String {
        serde_html_form::to_string(pairs).unwrap_or_default()
    }

    fn link(base: &str, pairs: &[(&str, String)]) -> String {
        let query = Self::encode(pairs);
        if query.is_empty() {
            base.to_string()
        } else {
            format!("{base}?{query}")
        }
    }

    fn filter_pairs(&self) -> Vec<(&str, String)> {
        self.filters
            .iter()
            .map(|(key, value)| (key.as_str(), value.clone()))
            .collect()
    }

    /// Link to `page` (1-based) with the current filters and a closed sheet.
    pub fn href_for_page(&self, base: &str, page: usize) -> String {
        let mut pairs = self.filter_pairs();
        if page > 1 {
            pairs.push((PAGE_PARAM, page.to_string()));
        }
        Self::link(base, &pairs)
    }

    /// Link back to the current view with every sheet closed.
    pub fn href(&self, base: &str) -> String {
        self.href_for_page(base, self.page.unwrap_or(1))
    }

    /// Link to the current view with `sheet` open.
    pub fn href_with_sheet(&self, base: &str, sheet: &SheetRequest) -> String {
        let mut pairs = self.filter_pairs();
        if let Some(page) = self.page.filter(|page| *page > 1) {
            pairs.push((PAGE_PARAM, page.to_string()));
        }
        match sheet {
            SheetRequest::None => {}
            SheetRequest::Create => pairs.push((SHEET_PARAM, "create".to_string())),
            SheetRequest::Edit(id) => pairs.push((EDIT_PARAM, id.clone())),
            SheetRequest::Delete(id) => pairs.push((DELETE_PARAM, id.clone())),
        }
        Self::link(base, &pairs)
    }

    /// Pagination links for `control`, rendered 1-based.
    pub fn pagination(
        &self,
        base: &str,
        control: PaginationControl,
        items_to_display: usize,
    ) -> PaginationView {
        let window = control.window(items_to_display);
        PaginationView {
            links: window
                .pages
                .iter()
                .map(|&number| PageLink {
                    number,
                    href: self.href_for_page(base, number),
                    current: number == window.current,
                })
                .collect(),
            previous: control
                .previous()
                .map(|index| self.href_for_page(base, index + 1)),
            next: control
                .next()
                .map(|index| self.href_for_page(base, index + 1)),
            first: self.href_for_page(base, 1),
            last: self.href_for_page(base, control.total_pages().max(1)),
            left_ellipsis: window.left_ellipsis,
            right_ellipsis: window.right_ellipsis,
            total_pages: control.total_pages(),
        }
    }
}

#[derive(Clone, Debug, Serialize, PartialEq, Eq)]
pub struct PageLink {
    pub number: usize,
    pub href: String,
    pub current: bool,
}

/// Everything a template needs to draw the numbered pagination control.
/// `previous` and `next` are absent at the boundaries so the controls render
/// without a target.
#[derive(Clone, Debug, Serialize, PartialEq, Eq)]
pub struct PaginationView {
    pub links: Vec<PageLink>,
    pub previous: Option<String>,
    pub next: Option<String>,
    pub first: String,
    pub last: String,
    pub left_ellipsis: bool,
    pub right_ellipsis: bool,
    pub total_pages: usize,
}
