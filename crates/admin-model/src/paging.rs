use serde::{Deserialize, Serialize};

/// One page of records returned by the association source.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PagedResponse<T> {
    #[serde(default = "Vec::new")]
    pub list: Vec<T>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub total: Option<u64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub page: Option<u32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub page_size: Option<u32>,
}

impl<T> PagedResponse<T> {
    pub fn from_list(list: Vec<T>) -> Self {
        Self {
            list,
            total: None,
            page: None,
            page_size: None,
        }
    }
}

impl<T> Default for PagedResponse<T> {
    fn default() -> Self {
        Self::from_list(Vec::new())
    }
}

/// Candidate search parameters; `page` is 1-based.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AssociationQuery {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub keywords: Option<String>,
    pub page: u32,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub page_size: Option<u32>,
}

impl AssociationQuery {
    pub fn first_page() -> Self {
        Self {
            keywords: None,
            page: 1,
            page_size: None,
        }
    }

    pub fn search(keywords: impl Into<String>, page: u32) -> Self {
        let keywords = keywords.into();
        Self {
            keywords: if keywords.trim().is_empty() {
                None
            } else {
                Some(keywords)
            },
            page: page.max(1),
            page_size: None,
        }
    }

    #[must_use]
    pub fn with_page_size(mut self, page_size: u32) -> Self {
        self.page_size = Some(page_size);
        self
    }
}
