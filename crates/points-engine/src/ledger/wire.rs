//! 账本 HTTP 接口的报文结构
//!
//! 字段名沿用账本服务的葡萄牙语命名（`pontos`、`quantidade` 等），
//! 客户端与模拟账本服务共用这些定义。

use serde::{Deserialize, Serialize};

use crate::models::{Benefit, TransactionRecord};

/// 令牌所在的请求头
pub const ACCESS_TOKEN_HEADER: &str = "access-token";

/// `GET /usuario/pontos` 返回数组中的一行
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BalanceRow {
    pub pontos: i64,
}

/// `PUT /usuario/pontos` 请求体
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BalanceUpdate {
    pub pontos: u64,
}

/// `GET /beneficio` 返回数组中的一项
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BenefitRow {
    #[serde(rename = "_id")]
    pub id: String,
    pub nome: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub endereco: Option<String>,
    pub pontos: i64,
    pub quantidade: i64,
}

impl BenefitRow {
    /// 转换为领域模型；积分必须为正、库存不能为负
    pub fn into_benefit(self) -> Result<Benefit, String> {
        let point_cost = u64::try_from(self.pontos)
            .ok()
            .filter(|cost| *cost > 0)
            .ok_or_else(|| format!("权益 {} 的积分无效: {}", self.id, self.pontos))?;
        let available_quantity = u64::try_from(self.quantidade)
            .map_err(|_| format!("权益 {} 的库存无效: {}", self.id, self.quantidade))?;

        Ok(Benefit {
            id: self.id,
            name: self.nome,
            address: self.endereco,
            point_cost,
            available_quantity,
        })
    }
}

impl From<&Benefit> for BenefitRow {
    fn from(benefit: &Benefit) -> Self {
        Self {
            id: benefit.id.clone(),
            nome: benefit.name.clone(),
            endereco: benefit.address.clone(),
            pontos: i64::try_from(benefit.point_cost).unwrap_or(i64::MAX),
            quantidade: i64::try_from(benefit.available_quantity).unwrap_or(i64::MAX),
        }
    }
}

/// `PUT /beneficio/resgate` 请求体
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct QuantityUpdate {
    #[serde(rename = "_id")]
    pub id: String,
    pub quantidade: u64,
}

/// `POST /hist/pontos` 请求体（扫码入账历史）
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PointsHistoryEntry {
    pub id_user: String,
    pub points: u64,
    /// 扫码 hash
    pub id: String,
}

/// `POST /hist/transacoes` 请求体（兑换历史）
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TransactionHistoryEntry {
    pub id_user: String,
    /// 兑换消耗的积分（正数）
    pub points: u64,
    pub description: String,
    /// 权益 ID
    #[serde(default)]
    pub id: String,
}

impl From<&TransactionRecord> for PointsHistoryEntry {
    fn from(record: &TransactionRecord) -> Self {
        Self {
            id_user: record.user_id.clone(),
            points: record.magnitude(),
            id: record.source_id.clone(),
        }
    }
}

impl From<&TransactionRecord> for TransactionHistoryEntry {
    fn from(record: &TransactionRecord) -> Self {
        Self {
            id_user: record.user_id.clone(),
            points: record.magnitude(),
            description: record.description.clone(),
            id: record.source_id.clone(),
        }
    }
}

/// `POST /usuario/login` 请求体
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LoginRequest {
    pub email: String,
    pub senha: String,
}

/// `POST /usuario/login` 响应
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LoginResponse {
    pub access_token: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub redirect_url: Option<String>,
}

/// `GET /usuario/me` 响应
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UserProfile {
    #[serde(rename = "_id")]
    pub id: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub nome: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub email: Option<String>,
    /// 使用临时密码登录时存在，客户端需要引导用户重设密码
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub reset_password_token: Option<String>,
}

/// 账本服务的错误响应：`{"errors": [{"msg": "..."}]}` 或 `{"error": "..."}`
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ErrorBody {
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub errors: Vec<ErrorMessage>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ErrorMessage {
    pub msg: String,
}

impl ErrorBody {
    pub fn message(message: impl Into<String>) -> Self {
        Self {
            errors: Vec::new(),
            error: Some(message.into()),
        }
    }

    /// 合并为一行可读文本
    pub fn summary(&self) -> Option<String> {
        if !self.errors.is_empty() {
            return Some(
                self.errors
                    .iter()
                    .map(|e| e.msg.as_str())
                    .collect::<Vec<_>>()
                    .join("; "),
            );
        }
        self.error.clone()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_benefit_row_into_benefit() {
        let row: BenefitRow = serde_json::from_value(json!({
            "_id": "B1",
            "nome": "Cupom feira",
            "endereco": "Rua A, 10",
            "pontos": 40,
            "quantidade": 3
        }))
        .unwrap();

        let benefit = row.into_benefit().unwrap();
        assert_eq!(benefit.id, "B1");
        assert_eq!(benefit.point_cost, 40);
        assert_eq!(benefit.available_quantity, 3);
        assert_eq!(benefit.address.as_deref(), Some("Rua A, 10"));
    }

    #[test]
    fn test_benefit_row_rejects_invalid_numbers() {
        let free = BenefitRow {
            id: "B1".to_string(),
            nome: "x".to_string(),
            endereco: None,
            pontos: 0,
            quantidade: 1,
        };
        assert!(free.into_benefit().is_err());

        let negative_stock = BenefitRow {
            id: "B2".to_string(),
            nome: "x".to_string(),
            endereco: None,
            pontos: 10,
            quantidade: -1,
        };
        assert!(negative_stock.into_benefit().is_err());
    }

    #[test]
    fn test_history_entries_use_service_field_names() {
        let benefit = Benefit::new("B1", "Cupom feira", 40, 3);
        let record = TransactionRecord::redemption("user-1", &benefit);

        let json = serde_json::to_value(TransactionHistoryEntry::from(&record)).unwrap();
        assert_eq!(json["idUser"], "user-1");
        assert_eq!(json["points"], 40);
        assert_eq!(json["description"], "Cupom feira");
        assert_eq!(json["id"], "B1");
    }

    #[test]
    fn test_error_body_summary() {
        let body: ErrorBody = serde_json::from_value(json!({
            "errors": [{"msg": "Email inválido"}, {"msg": "Senha obrigatória"}]
        }))
        .unwrap();
        assert_eq!(
            body.summary().as_deref(),
            Some("Email inválido; Senha obrigatória")
        );

        assert_eq!(
            ErrorBody::message("Out of stock").summary().as_deref(),
            Some("Out of stock")
        );
        assert!(ErrorBody::default().summary().is_none());
    }
}
