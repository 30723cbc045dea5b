//! 扫码载荷
//!
//! 二维码内容为 JSON 对象：`{"hash": "...", "pontos": 25}`，`points` 作为 `pontos` 的别名。

use serde::Serialize;
use serde_json::Value;

use crate::error::{PointsError, Result};

/// 一次扫码解码出的载荷
///
/// `hash` 标识实体二维码，`points` 为奖励积分（非负）。
/// 字段私有，只能经过校验构造。
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ScanPayload {
    hash: String,
    points: u64,
}

impl ScanPayload {
    /// 校验并构造载荷
    pub fn new(hash: impl Into<String>, points: i64) -> Result<Self> {
        let hash = hash.into();
        if hash.trim().is_empty() {
            return Err(PointsError::InvalidPayload("hash 为空".to_string()));
        }
        let points = u64::try_from(points)
            .map_err(|_| PointsError::InvalidPayload(format!("积分不能为负数: {}", points)))?;

        Ok(Self { hash, points })
    }

    /// 解码一次扫码事件的原始文本
    pub fn decode(raw: &str) -> Result<Self> {
        let value: Value = serde_json::from_str(raw.trim())
            .map_err(|e| PointsError::InvalidPayload(format!("不是合法的 JSON: {}", e)))?;

        let object = value
            .as_object()
            .ok_or_else(|| PointsError::InvalidPayload("载荷必须是 JSON 对象".to_string()))?;

        let hash = match object.get("hash") {
            Some(Value::String(s)) => s.clone(),
            Some(Value::Number(n)) => n.to_string(),
            _ => return Err(PointsError::InvalidPayload("缺少 hash 字段".to_string())),
        };

        let points = object
            .get("pontos")
            .or_else(|| object.get("points"))
            .ok_or_else(|| PointsError::InvalidPayload("缺少 pontos 字段".to_string()))?;

        Self::new(hash, parse_points(points)?)
    }

    pub fn hash(&self) -> &str {
        &self.hash
    }

    pub fn points(&self) -> u64 {
        self.points
    }
}

/// 积分只接受整数（或纯数字字符串），小数与其他类型一律拒绝
fn parse_points(value: &Value) -> Result<i64> {
    match value {
        Value::Number(n) => n
            .as_i64()
            .ok_or_else(|| PointsError::InvalidPayload(format!("积分必须是整数: {}", n))),
        Value::String(s) => s
            .trim()
            .parse::<i64>()
            .map_err(|_| PointsError::InvalidPayload(format!("积分不是数字: {:?}", s))),
        other => Err(PointsError::InvalidPayload(format!(
            "积分类型无效: {}",
            other
        ))),
    }
}
