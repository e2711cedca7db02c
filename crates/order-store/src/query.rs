use crate::{Order, OrderStatus, ServiceId};

/// Builder for filtered, paginated order listings.
///
/// Results are always ordered newest first. Soft-deleted orders never match.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OrderQuery {
    /// Case-insensitive substring matched against code, name, email and phone.
    pub search: Option<String>,

    /// Filter by status.
    pub status: Option<OrderStatus>,

    /// Filter by ordered service.
    pub service_id: Option<ServiceId>,

    /// 1-based page number.
    pub page: usize,

    /// Page size, clamped to `1..=MAX_PER_PAGE`.
    pub per_page: usize,
}

impl OrderQuery {
    pub const DEFAULT_PER_PAGE: usize = 15;
    pub const MAX_PER_PAGE: usize = 100;

    /// Creates a query for the first page with no filters.
    pub fn new() -> Self {
        Self::default()
    }

    /// Sets the search term. Blank terms clear the filter.
    pub fn search(mut self, term: impl Into<String>) -> Self {
        let term = term.into();
        let term = term.trim();
        self.search = (!term.is_empty()).then(|| term.to_string());
        self
    }

    /// Filters by status.
    pub fn status(mut self, status: OrderStatus) -> Self {
        self.status = Some(status);
        self
    }

    /// Filters by ordered service.
    pub fn service_id(mut self, service_id: ServiceId) -> Self {
        self.service_id = Some(service_id);
        self
    }

    /// Selects a page (pages start at 1).
    pub fn page(mut self, page: usize) -> Self {
        self.page = page.max(1);
        self
    }

    /// Sets the page size.
    pub fn per_page(mut self, per_page: usize) -> Self {
        self.per_page = per_page.clamp(1, Self::MAX_PER_PAGE);
        self
    }

    /// Number of rows to skip for the selected page. Saturates for page
    /// numbers past the addressable range.
    pub fn offset(&self) -> usize {
        self.page.saturating_sub(1).saturating_mul(self.per_page)
    }

    /// Returns true if `order` passes every filter of this query.
    pub fn matches(&self, order: &Order) -> bool {
        if order.is_deleted() {
            return false;
        }
        if let Some(status) = self.status
            && order.status != status
        {
            return false;
        }
        if let Some(service_id) = self.service_id
            && order.service_id != service_id
        {
            return false;
        }
        if let Some(ref term) = self.search {
            let term = term.to_lowercase();
            let hit = [
                &order.code,
                &order.customer.name,
                &order.customer.email,
                &order.customer.phone,
            ]
            .iter()
            .any(|field| field.to_lowercase().contains(&term));
            if !hit {
                return false;
            }
        }
        true
    }
}

impl Default for OrderQuery {
    fn default() -> Self {
        Self {
            search: None,
            status: None,
            service_id: None,
            page: 1,
            per_page: Self::DEFAULT_PER_PAGE,
        }
    }
}
