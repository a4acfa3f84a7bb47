//! Work order detail shown in the session view's side panel.

/// Fallback label when no POP document is registered for the operation.
pub const NO_POP_LABEL: &str = "No POP registered";

/// Material consumed by a work order.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct Material {
    pub code: Option<String>,
    pub description: Option<String>,
    pub stock_location: Option<String>,
}

/// Routing and supporting documents for a work order operation.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct WorkOrderDetail {
    pub operation: Option<String>,
    pub machine: Option<String>,
    pub materials: Vec<Material>,
    pub drawing_url: Option<String>,
    pub pop_url: Option<String>,
    pub pop_name: Option<String>,
}

impl WorkOrderDetail {
    /// Label for the POP (standard operating procedure) link.
    pub fn pop_label(&self) -> &str {
        match (&self.pop_url, &self.pop_name) {
            (Some(_), Some(name)) if !name.is_empty() => name,
            (Some(url), _) => url,
            (None, _) => NO_POP_LABEL,
        }
    }

    /// Returns true when the detail lists no materials.
    pub fn has_materials(&self) -> bool {
        !self.materials.is_empty()
    }
}
