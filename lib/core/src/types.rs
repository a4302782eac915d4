use serde::{Deserialize, Serialize};

/// Pagination parameters for list endpoints.
///
/// `page` is 1-based. `limit` defaults to 20 and is capped at 100.
#[derive(Debug, Clone, Copy, Deserialize)]
pub struct PageParams {
    #[serde(default = "default_page")]
    pub page: usize,

    #[serde(default = "default_limit")]
    pub limit: usize,
}

fn default_page() -> usize {
    1
}

fn default_limit() -> usize {
    20
}

impl PageParams {
    /// Clamp to sane bounds: page >= 1, 1 <= limit <= 100.
    pub fn normalized(self) -> Self {
        Self {
            page: self.page.max(1),
            limit: self.limit.clamp(1, 100),
        }
    }

    /// Row offset for this page.
    pub fn offset(&self) -> usize {
        (self.page - 1) * self.limit
    }
}

impl Default for PageParams {
    fn default() -> Self {
        Self {
            page: default_page(),
            limit: default_limit(),
        }
    }
}

/// A page of results plus the navigation metadata every list payload
/// carries: `count`, `currentPage`, `nextUrl`, `previousUrl`.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Page<T: Serialize> {
    pub items: Vec<T>,
    pub count: usize,
    pub current_page: usize,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub next_url: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub previous_url: Option<String>,
}

impl<T: Serialize> Page<T> {
    /// Build a page from the items of the current window plus the total
    /// count, deriving next/previous URLs against `base_path`.
    pub fn new(items: Vec<T>, count: usize, params: &PageParams, base_path: &str) -> Self {
        let params = params.normalized();
        let pages = count.div_ceil(params.limit).max(1);

        let next_url = (params.page < pages)
            .then(|| format!("{}?page={}&limit={}", base_path, params.page + 1, params.limit));
        let previous_url = (params.page > 1 && params.page <= pages)
            .then(|| format!("{}?page={}&limit={}", base_path, params.page - 1, params.limit));

        Self {
            items,
            count,
            current_page: params.page,
            next_url,
            previous_url,
        }
    }
}

/// Generate a new random ID (UUIDv4, no dashes).
pub fn new_id() -> String {
    uuid::Uuid::new_v4().to_string().replace('-', "")
}

/// Get the current time as an RFC 3339 string.
pub fn now_rfc3339() -> String {
    chrono::Utc::now().to_rfc3339()
}

/// Today's date in UTC. All activity-date arithmetic uses this.
pub fn today() -> chrono::NaiveDate {
    chrono::Utc::now().date_naive()
}

/// Standard success envelope: `{"status": "success", "message": ..., "data": ...}`.
pub fn success(message: &str, data: serde_json::Value) -> serde_json::Value {
    serde_json::json!({
        "status": "success",
        "message": message,
        "data": data,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_new_id() {
        let id = new_id();
        assert_eq!(id.len(), 32);
        assert!(!id.contains('-'));
    }

    #[test]
    fn page_params_normalized() {
        let p = PageParams { page: 0, limit: 500 }.normalized();
        assert_eq!(p.page, 1);
        assert_eq!(p.limit, 100);
        assert_eq!(p.offset(), 0);

        let p = PageParams { page: 3, limit: 20 };
        assert_eq!(p.offset(), 40);
    }

    #[test]
    fn page_navigation_urls() {
        let params = PageParams { page: 2, limit: 10 };
        let page = Page::new(vec![1, 2, 3], 35, &params, "/api/v1/logged-activities");

        assert_eq!(page.count, 35);
        assert_eq!(page.current_page, 2);
        assert_eq!(
            page.next_url.as_deref(),
            Some("/api/v1/logged-activities?page=3&limit=10")
        );
        assert_eq!(
            page.previous_url.as_deref(),
            Some("/api/v1/logged-activities?page=1&limit=10")
        );
    }

    #[test]
    fn page_edges_have_no_dangling_urls() {
        let first = Page::new(vec![1], 25, &PageParams { page: 1, limit: 10 }, "/x");
        assert!(first.previous_url.is_none());
        assert!(first.next_url.is_some());

        let last = Page::new(vec![1], 25, &PageParams { page: 3, limit: 10 }, "/x");
        assert!(last.next_url.is_none());
        assert!(last.previous_url.is_some());

        let empty = Page::new(Vec::<i32>::new(), 0, &PageParams::default(), "/x");
        assert!(empty.next_url.is_none());
        assert!(empty.previous_url.is_none());
        assert_eq!(empty.current_page, 1);
    }

    #[test]
    fn success_envelope_shape() {
        let v = success("Society created successfully.", serde_json::json!({"id": "abc"}));
        assert_eq!(v["status"], "success");
        assert_eq!(v["message"], "Society created successfully.");
        assert_eq!(v["data"]["id"], "abc");
    }
}
