//! Wire DTOs for the shop-floor session service.
//!
//! Every response is a JSON envelope with a `success` flag. On failure the
//! reason is in `error` or `message`, with an optional `code`. Column-named
//! fields come straight from the ERP tables and may arrive as strings or
//! numbers, so they are read leniently.

use serde::de::{DeserializeOwned, Deserializer};
use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::domain::foundation::{
    CompanyId, FloorTimestamp, OperatorCode, SessionId, WorkOrderId,
};
use crate::domain::session::{GoodQuantity, Session, SessionHistory};
use crate::domain::work_order::{DrawingPath, Material, WorkOrder, WorkOrderDetail};
use crate::ports::BackendError;

// ════════════════════════════════════════════════════════════════════════════
// Envelope
// ════════════════════════════════════════════════════════════════════════════

#[derive(Debug, Deserialize)]
struct EnvelopeHeader {
    success: Option<bool>,
    #[serde(default, deserialize_with = "opt_string")]
    error: Option<String>,
    #[serde(default, deserialize_with = "opt_string")]
    message: Option<String>,
    #[serde(default, deserialize_with = "opt_string")]
    code: Option<String>,
}

/// Decodes an envelope body into its success payload.
///
/// # Errors
///
/// - `Decode` if the body is not JSON, lacks `success`, or the payload has
///   the wrong shape
/// - `Rejected` if `success` is false
pub fn decode_envelope<T: DeserializeOwned>(body: &str) -> Result<T, BackendError> {
    let value: Value = serde_json::from_str(body)
        .map_err(|e| BackendError::decode(format!("invalid JSON: {}", e)))?;
    if !value.is_object() {
        return Err(BackendError::decode("response is not a JSON object"));
    }

    let header: EnvelopeHeader = serde_json::from_value(value.clone())
        .map_err(|e| BackendError::decode(format!("invalid envelope: {}", e)))?;
    match header.success {
        None => Err(BackendError::decode("missing success indicator")),
        Some(false) => Err(BackendError::rejected(
            header.error.or(header.message).unwrap_or_default(),
            header.code,
        )),
        Some(true) => serde_json::from_value(value)
            .map_err(|e| BackendError::decode(format!("unexpected payload: {}", e))),
    }
}

// ════════════════════════════════════════════════════════════════════════════
// Request DTOs
// ════════════════════════════════════════════════════════════════════════════

/// Body of `POST /api/session/pause`.
#[derive(Debug, Clone, Serialize)]
pub struct PauseSessionBody {
    pub apontamento_id: SessionId,
}

/// Body of `POST /api/session/finish`.
#[derive(Debug, Clone, Serialize)]
pub struct FinishSessionBody {
    pub apontamento_id: SessionId,
    pub quantidade_boa: GoodQuantity,
}

// ════════════════════════════════════════════════════════════════════════════
// Response DTOs
// ════════════════════════════════════════════════════════════════════════════

/// Success payload with no fields of interest.
#[derive(Debug, Clone, Deserialize)]
pub struct EmptyPayload {}

#[derive(Debug, Clone, Deserialize)]
pub struct SequencingPayload {
    #[serde(default)]
    pub jobs: Vec<JobDto>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct DetailPayload {
    #[serde(default)]
    pub data: Option<DetailDto>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct StartPayload {
    #[serde(default, deserialize_with = "opt_i64")]
    pub apontamento_id: Option<i64>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct ListPayload {
    #[serde(default)]
    pub apontamentos: Vec<SessionDto>,
    #[serde(default)]
    pub total: Option<u64>,
}

/// One row of the operator's sequencing queue.
#[derive(Debug, Clone, Deserialize)]
pub struct JobDto {
    #[serde(rename = "SOC_CODIOF", default, deserialize_with = "opt_string")]
    pub order_id: Option<String>,
    #[serde(rename = "SOC_EMPRESA", default, deserialize_with = "opt_string")]
    pub company_id: Option<String>,
    #[serde(rename = "SOC_CODSEQ", default, deserialize_with = "opt_i64")]
    pub operation_sequence: Option<i64>,
    #[serde(rename = "SOC_SEQUEN", default, deserialize_with = "opt_i64")]
    pub queue_position: Option<i64>,
    #[serde(rename = "JRO_PROERP", default, deserialize_with = "opt_string")]
    pub product_code: Option<String>,
    #[serde(rename = "JRO_DESCRI", default, deserialize_with = "opt_string")]
    pub description: Option<String>,
    #[serde(rename = "JRO_UNIMED", default, deserialize_with = "opt_string")]
    pub unit: Option<String>,
    #[serde(rename = "QUANTIDADE_PROGRAMADA", default, deserialize_with = "opt_f64")]
    pub programmed: Option<f64>,
    #[serde(rename = "QUANTIDADE_REALIZADA", default, deserialize_with = "opt_f64")]
    pub realized: Option<f64>,
    #[serde(rename = "JPC_DESENHO_ENG", default, deserialize_with = "opt_string")]
    pub drawing: Option<String>,
    #[serde(rename = "JLB_NOMECB", default, deserialize_with = "opt_string")]
    pub operator_name: Option<String>,
}

impl TryFrom<JobDto> for WorkOrder {
    type Error = BackendError;

    fn try_from(dto: JobDto) -> Result<Self, Self::Error> {
        let id = WorkOrderId::new(dto.order_id.unwrap_or_default())
            .map_err(|e| BackendError::decode(format!("job: {}", e)))?;
        let company = CompanyId::new(dto.company_id.unwrap_or_default())
            .map_err(|e| BackendError::decode(format!("job {}: {}", id, e)))?;
        // A drawing path the client refuses to request is shown as absent.
        let drawing = dto.drawing.and_then(|p| DrawingPath::new(p).ok());

        Ok(WorkOrder::new(id, company)
            .with_operation_sequence(dto.operation_sequence)
            .with_queue_position(dto.queue_position)
            .with_product(dto.product_code, dto.description)
            .with_unit(dto.unit)
            .with_quantities(
                dto.programmed.unwrap_or_default(),
                dto.realized.unwrap_or_default(),
            )
            .with_drawing(drawing)
            .with_operator_name(dto.operator_name))
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct MaterialDto {
    #[serde(default, deserialize_with = "opt_string")]
    pub codigo: Option<String>,
    #[serde(default, deserialize_with = "opt_string")]
    pub descricao: Option<String>,
    #[serde(default, deserialize_with = "opt_string")]
    pub estoque: Option<String>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct DetailDto {
    #[serde(default, deserialize_with = "opt_string")]
    pub operacao: Option<String>,
    #[serde(default, deserialize_with = "opt_string")]
    pub maquina: Option<String>,
    #[serde(default)]
    pub materiais: Vec<MaterialDto>,
    #[serde(default, deserialize_with = "opt_string")]
    pub desenho_url: Option<String>,
    #[serde(default, deserialize_with = "opt_string")]
    pub pop_url: Option<String>,
    #[serde(default, deserialize_with = "opt_string")]
    pub pop_nome: Option<String>,
}

impl From<DetailDto> for WorkOrderDetail {
    fn from(dto: DetailDto) -> Self {
        Self {
            operation: dto.operacao,
            machine: dto.maquina,
            materials: dto
                .materiais
                .into_iter()
                .map(|m| Material {
                    code: m.codigo,
                    description: m.descricao,
                    stock_location: m.estoque,
                })
                .collect(),
            drawing_url: dto.desenho_url,
            pop_url: dto.pop_url,
            pop_name: dto.pop_nome,
        }
    }
}

/// One recorded session as listed by the server.
#[derive(Debug, Clone, Deserialize)]
pub struct SessionDto {
    #[serde(rename = "SOF_APONTAOFID", default, deserialize_with = "opt_i64")]
    pub id: Option<i64>,
    #[serde(rename = "SOF_CODIOF", default, deserialize_with = "opt_string")]
    pub order_id: Option<String>,
    #[serde(rename = "SOF_OPERAD", default, deserialize_with = "opt_string")]
    pub operator: Option<String>,
    #[serde(rename = "SOF_DTINIC", default, deserialize_with = "opt_string")]
    pub started_at: Option<String>,
    #[serde(rename = "SOF_DTAFIM", default, deserialize_with = "opt_string")]
    pub ended_at: Option<String>,
    #[serde(rename = "SOF_QNTBOA", default, deserialize_with = "opt_f64")]
    pub good_quantity: Option<f64>,
    #[serde(rename = "SOF_ERROINTEGRA", default, deserialize_with = "opt_string")]
    pub integration_error: Option<String>,
}

impl TryFrom<SessionDto> for Session {
    type Error = BackendError;

    fn try_from(dto: SessionDto) -> Result<Self, Self::Error> {
        let id = dto
            .id
            .map(SessionId::new)
            .ok_or_else(|| BackendError::decode("session without SOF_APONTAOFID"))?;
        Ok(Session::reconstitute(
            id,
            dto.order_id.and_then(|v| WorkOrderId::new(v).ok()),
            dto.operator.and_then(|v| OperatorCode::new(v).ok()),
            dto.started_at.map(FloorTimestamp::parse),
            dto.ended_at.map(FloorTimestamp::parse),
            dto.good_quantity.and_then(|q| GoodQuantity::new(q).ok()),
            dto.integration_error,
        ))
    }
}

impl TryFrom<ListPayload> for SessionHistory {
    type Error = BackendError;

    fn try_from(payload: ListPayload) -> Result<Self, Self::Error> {
        let sessions = payload
            .apontamentos
            .into_iter()
            .map(Session::try_from)
            .collect::<Result<Vec<_>, _>>()?;
        Ok(SessionHistory::new(sessions))
    }
}

// ════════════════════════════════════════════════════════════════════════════
// Lenient field readers
// ════════════════════════════════════════════════════════════════════════════

/// String, number or null. Blank strings read as `None`.
fn opt_string<'de, D: Deserializer<'de>>(deserializer: D) -> Result<Option<String>, D::Error> {
    Ok(match Option::<Value>::deserialize(deserializer)? {
        Some(Value::String(s)) if !s.trim().is_empty() => Some(s.trim().to_string()),
        Some(Value::Number(n)) => Some(n.to_string()),
        Some(Value::Bool(b)) => Some(b.to_string()),
        _ => None,
    })
}

/// Number, numeric string or null.
fn opt_f64<'de, D: Deserializer<'de>>(deserializer: D) -> Result<Option<f64>, D::Error> {
    Ok(match Option::<Value>::deserialize(deserializer)? {
        Some(Value::Number(n)) => n.as_f64(),
        Some(Value::String(s)) => s.trim().replace(',', ".").parse().ok(),
        _ => None,
    })
}

/// Integer, integral float, numeric string or null.
fn opt_i64<'de, D: Deserializer<'de>>(deserializer: D) -> Result<Option<i64>, D::Error> {
    Ok(match Option::<Value>::deserialize(deserializer)? {
        Some(Value::Number(n)) => n
            .as_i64()
            .or_else(|| n.as_f64().filter(|f| f.fract() == 0.0).map(|f| f as i64)),
        Some(Value::String(s)) => s.trim().parse().ok(),
        _ => None,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::session::SessionProgress;

    #[test]
    fn missing_success_is_decode_error() {
        let err = decode_envelope::<EmptyPayload>(r#"{"apontamento_id": 1}"#).unwrap_err();
        assert!(matches!(err, BackendError::Decode(_)));
    }

    #[test]
    fn non_json_is_decode_error() {
        let err = decode_envelope::<EmptyPayload>("<html>502</html>").unwrap_err();
        assert!(matches!(err, BackendError::Decode(_)));
    }

    #[test]
    fn failure_prefers_error_over_message() {
        let err = decode_envelope::<EmptyPayload>(
            r#"{"success": false, "error": "boom", "message": "other"}"#,
        )
        .unwrap_err();
        assert_eq!(err, BackendError::rejected("boom", None));
    }

    #[test]
    fn failure_carries_code() {
        let err = decode_envelope::<EmptyPayload>(
            r#"{"success": false, "code": "APONTAMENTO_ABERTO", "message": "open"}"#,
        )
        .unwrap_err();
        assert!(err.is_conflict());
        assert_eq!(err, BackendError::rejected("open", Some("APONTAMENTO_ABERTO".into())));
    }

    #[test]
    fn start_payload_accepts_string_id() {
        let payload: StartPayload =
            decode_envelope(r#"{"success": true, "apontamento_id": "42"}"#).unwrap();
        assert_eq!(payload.apontamento_id, Some(42));
    }

    #[test]
    fn start_payload_without_id() {
        let payload: StartPayload = decode_envelope(r#"{"success": true}"#).unwrap();
        assert_eq!(payload.apontamento_id, None);
    }

    #[test]
    fn wrong_payload_shape_is_decode_error() {
        let err =
            decode_envelope::<ListPayload>(r#"{"success": true, "apontamentos": 3}"#).unwrap_err();
        assert!(matches!(err, BackendError::Decode(_)));
    }

    #[test]
    fn job_maps_to_work_order() {
        let dto: JobDto = serde_json::from_value(serde_json::json!({
            "SOC_CODIOF": 1234,
            "SOC_EMPRESA": "1",
            "SOC_CODSEQ": 20,
            "SOC_SEQUEN": 3,
            "JRO_PROERP": "P-1",
            "JRO_DESCRI": "Bracket",
            "JRO_UNIMED": "PC",
            "QUANTIDADE_PROGRAMADA": "100",
            "QUANTIDADE_REALIZADA": 40,
            "JPC_DESENHO_ENG": "eng/bracket.step",
            "JLB_NOMECB": "Ana"
        }))
        .unwrap();
        let order = WorkOrder::try_from(dto).unwrap();
        assert_eq!(order.id().as_str(), "1234");
        assert_eq!(order.operation_sequence(), Some(20));
        assert_eq!(order.progress().percent, 40);
        assert_eq!(order.drawing().unwrap().as_str(), "eng/bracket.step");
        assert_eq!(order.operator_name(), Some("Ana"));
    }

    #[test]
    fn job_without_order_id_is_rejected() {
        let dto: JobDto = serde_json::from_value(serde_json::json!({"SOC_EMPRESA": "1"})).unwrap();
        assert!(WorkOrder::try_from(dto).is_err());
    }

    #[test]
    fn job_with_traversal_drawing_has_no_drawing() {
        let dto: JobDto = serde_json::from_value(serde_json::json!({
            "SOC_CODIOF": "OF-1",
            "SOC_EMPRESA": "1",
            "JPC_DESENHO_ENG": "../etc/passwd"
        }))
        .unwrap();
        assert!(WorkOrder::try_from(dto).unwrap().drawing().is_none());
    }

    #[test]
    fn session_rows_map_to_history() {
        let payload: ListPayload = decode_envelope(
            r#"{
                "success": true,
                "total": 2,
                "apontamentos": [
                    {"SOF_APONTAOFID": 8, "SOF_OPERAD": "77", "SOF_DTINIC": "02/01/2025 08:00:00", "SOF_DTAFIM": null},
                    {"SOF_APONTAOFID": 7, "SOF_OPERAD": "77", "SOF_DTINIC": "01/01/2025 08:00:00",
                     "SOF_DTAFIM": "01/01/2025 09:00:00", "SOF_QNTBOA": 15, "SOF_ERROINTEGRA": ""}
                ]
            }"#,
        )
        .unwrap();
        assert_eq!(payload.total, Some(2));
        let history = SessionHistory::try_from(payload).unwrap();
        assert_eq!(history.open_session().unwrap().id(), SessionId::new(8));
        assert_eq!(history.sessions()[1].progress(), SessionProgress::Finished);
        assert_eq!(history.sessions()[1].integration_error(), None);
    }

    #[test]
    fn session_without_id_fails_listing() {
        let payload: ListPayload =
            decode_envelope(r#"{"success": true, "apontamentos": [{"SOF_OPERAD": "77"}]}"#)
                .unwrap();
        assert!(SessionHistory::try_from(payload).is_err());
    }

    #[test]
    fn finish_body_serializes_whole_quantity_as_integer() {
        let body = FinishSessionBody {
            apontamento_id: SessionId::new(42),
            quantidade_boa: GoodQuantity::new(15.0).unwrap(),
        };
        assert_eq!(
            serde_json::to_value(&body).unwrap(),
            serde_json::json!({"apontamento_id": 42, "quantidade_boa": 15})
        );
    }
}
