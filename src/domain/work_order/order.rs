//! WorkOrder value object.
//!
//! A snapshot of one sequenced job as handed out by the sequencing lookup.
//! The controller never mutates it; a fresh snapshot arrives with every
//! sequencing reload.

use std::fmt;

use crate::domain::foundation::{CompanyId, ValidationError, WorkOrderId};

/// Operation sequence used when the job does not carry one.
pub const DEFAULT_OPERATION_SEQUENCE: i64 = 1;

/// Server-side path of an engineering drawing attached to a product.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DrawingPath(String);

impl DrawingPath {
    /// Creates a drawing path, rejecting blanks and parent-directory hops.
    pub fn new(path: impl Into<String>) -> Result<Self, ValidationError> {
        let path = path.into().trim().to_string();
        if path.is_empty() {
            return Err(ValidationError::empty_field("file_path"));
        }
        if path.contains("..") {
            return Err(ValidationError::invalid_format(
                "file_path",
                "parent directory segments are not allowed",
            ));
        }
        Ok(Self(path))
    }

    /// Returns the path as sent to the download endpoint.
    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// File name component, used when saving the download locally.
    pub fn file_name(&self) -> &str {
        self.0
            .rsplit(['/', '\\'])
            .next()
            .filter(|name| !name.is_empty())
            .unwrap_or(&self.0)
    }
}

impl fmt::Display for DrawingPath {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Programmed vs. realized quantities of a work order.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Progress {
    pub programmed: f64,
    pub realized: f64,
    pub remaining: f64,
    /// Rounded percentage, capped at 100.
    pub percent: u8,
}

/// A manufacturing work order assigned to the operator.
#[derive(Debug, Clone, PartialEq)]
pub struct WorkOrder {
    id: WorkOrderId,
    company: CompanyId,
    operation_sequence: Option<i64>,
    queue_position: Option<i64>,
    product_code: Option<String>,
    description: Option<String>,
    unit: Option<String>,
    programmed_quantity: f64,
    realized_quantity: f64,
    drawing: Option<DrawingPath>,
    operator_name: Option<String>,
}

impl WorkOrder {
    /// Creates a work order with only its identity filled in.
    pub fn new(id: WorkOrderId, company: CompanyId) -> Self {
        Self {
            id,
            company,
            operation_sequence: None,
            queue_position: None,
            product_code: None,
            description: None,
            unit: None,
            programmed_quantity: 0.0,
            realized_quantity: 0.0,
            drawing: None,
            operator_name: None,
        }
    }

    pub fn with_operation_sequence(mut self, sequence: Option<i64>) -> Self {
        self.operation_sequence = sequence;
        self
    }

    pub fn with_queue_position(mut self, position: Option<i64>) -> Self {
        self.queue_position = position;
        self
    }

    pub fn with_product(mut self, code: Option<String>, description: Option<String>) -> Self {
        self.product_code = code;
        self.description = description;
        self
    }

    pub fn with_unit(mut self, unit: Option<String>) -> Self {
        self.unit = unit;
        self
    }

    pub fn with_quantities(mut self, programmed: f64, realized: f64) -> Self {
        self.programmed_quantity = programmed;
        self.realized_quantity = realized;
        self
    }

    pub fn with_drawing(mut self, drawing: Option<DrawingPath>) -> Self {
        self.drawing = drawing;
        self
    }

    pub fn with_operator_name(mut self, name: Option<String>) -> Self {
        self.operator_name = name;
        self
    }

    // ─────────────────────────────────────────────────────────────────────────
    // Accessors
    // ─────────────────────────────────────────────────────────────────────────

    pub fn id(&self) -> &WorkOrderId {
        &self.id
    }

    pub fn company(&self) -> &CompanyId {
        &self.company
    }

    /// Raw operation sequence, when the job carries one.
    pub fn operation_sequence(&self) -> Option<i64> {
        self.operation_sequence
    }

    /// Operation sequence sent with start requests.
    pub fn effective_operation_sequence(&self) -> i64 {
        self.operation_sequence.unwrap_or(DEFAULT_OPERATION_SEQUENCE)
    }

    pub fn queue_position(&self) -> Option<i64> {
        self.queue_position
    }

    pub fn product_code(&self) -> Option<&str> {
        self.product_code.as_deref()
    }

    pub fn description(&self) -> Option<&str> {
        self.description.as_deref()
    }

    pub fn unit(&self) -> Option<&str> {
        self.unit.as_deref()
    }

    pub fn drawing(&self) -> Option<&DrawingPath> {
        self.drawing.as_ref()
    }

    pub fn operator_name(&self) -> Option<&str> {
        self.operator_name.as_deref()
    }

    /// Checks whether this job is the one identified by order and company.
    pub fn matches(&self, id: &WorkOrderId, company: &CompanyId) -> bool {
        &self.id == id && &self.company == company
    }

    /// Computes the production progress shown in the detail panel.
    pub fn progress(&self) -> Progress {
        let programmed = self.programmed_quantity.max(0.0);
        let realized = self.realized_quantity.max(0.0);
        let percent = if programmed > 0.0 {
            ((realized / programmed) * 100.0).round().min(100.0) as u8
        } else {
            0
        };
        Progress {
            programmed,
            realized,
            remaining: (programmed - realized).max(0.0),
            percent,
        }
    }
}
