use serde::{Deserialize, Deserializer, Serialize};
use serde_json::Value;

use crate::grade::{GradeCoercion, GradeValue, KlGrade};

#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum ContractError {
    #[error("request rejected: {}", .0.as_deref().unwrap_or("no reason given"))]
    Rejected(Option<String>),
    #[error("malformed response: {0}")]
    Malformed(String),
}

fn number_of(value: &Value) -> Option<f64> {
    match value {
        Value::Number(n) => n.as_f64(),
        Value::String(text) => text.trim().parse::<f64>().ok().filter(|v| v.is_finite()),
        _ => None,
    }
}

fn grade_of(value: Value) -> Option<GradeValue> {
    match value {
        Value::Null => None,
        Value::Number(n) => Some(GradeValue::Number(n)),
        Value::String(text) => Some(GradeValue::Text(text)),
        // coerces as non-numeric
        other => Some(GradeValue::Text(other.to_string())),
    }
}

// Accepts any JSON value and keeps it when it is a number or a numeric string.
fn lenient_f64<'de, D>(deserializer: D) -> Result<Option<f64>, D::Error>
where
    D: Deserializer<'de>,
{
    let value = Value::deserialize(deserializer)?;
    Ok(number_of(&value))
}

fn lenient_grade<'de, D>(deserializer: D) -> Result<Option<GradeValue>, D::Error>
where
    D: Deserializer<'de>,
{
    Ok(grade_of(Value::deserialize(deserializer)?))
}

fn lenient_grades<'de, D>(deserializer: D) -> Result<Option<Vec<GradeValue>>, D::Error>
where
    D: Deserializer<'de>,
{
    match Value::deserialize(deserializer)? {
        Value::Array(items) => Ok(Some(
            items
                .into_iter()
                .map(|item| grade_of(item).unwrap_or_else(|| GradeValue::Text(String::new())))
                .collect(),
        )),
        _ => Ok(None),
    }
}

// Entries that are not numbers count as zero.
fn lenient_probs<'de, D>(deserializer: D) -> Result<Option<Vec<f64>>, D::Error>
where
    D: Deserializer<'de>,
{
    match Value::deserialize(deserializer)? {
        Value::Array(items) => Ok(Some(
            items.iter().map(|item| number_of(item).unwrap_or(0.0)).collect(),
        )),
        _ => Ok(None),
    }
}

/// Body of `POST /predict`, success and failure alike.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct PredictResponse {
    #[serde(default)]
    pub ok: bool,
    #[serde(default)]
    pub error: Option<String>,
    #[serde(default, deserialize_with = "lenient_grade")]
    pub class: Option<GradeValue>,
    #[serde(default, deserialize_with = "lenient_f64")]
    pub confidence: Option<f64>,
    #[serde(default, deserialize_with = "lenient_grades")]
    pub classes: Option<Vec<GradeValue>>,
    #[serde(default, deserialize_with = "lenient_probs")]
    pub probs: Option<Vec<f64>>,
    #[serde(default, deserialize_with = "lenient_f64")]
    pub inference_ms: Option<f64>,
    #[serde(default)]
    pub model: Option<String>,
    #[serde(default, deserialize_with = "lenient_f64")]
    pub test_acc: Option<f64>,
}

impl PredictResponse {
    pub fn parse(body: &str) -> Result<ClassificationResult, ContractError> {
        serde_json::from_str::<PredictResponse>(body)
            .map_err(|e| ContractError::Malformed(e.to_string()))?
            .into_result()
    }

    pub fn into_result(self) -> Result<ClassificationResult, ContractError> {
        if !self.ok {
            return Err(ContractError::Rejected(self.error));
        }

        let class_labels = self.classes.unwrap_or_default();
        let class_probabilities = self.probs.unwrap_or_default();
        if !class_labels.is_empty()
            && !class_probabilities.is_empty()
            && class_labels.len() != class_probabilities.len()
        {
            return Err(ContractError::Malformed(format!(
                "{} class labels but {} probabilities",
                class_labels.len(),
                class_probabilities.len()
            )));
        }

        Ok(ClassificationResult {
            predicted_class: self.class,
            confidence: self.confidence.unwrap_or(0.0),
            class_labels,
            class_probabilities,
            model_name: self.model.filter(|m| !m.is_empty()),
            inference_ms: self.inference_ms.filter(|ms| *ms >= 0.0),
            test_accuracy: self.test_acc,
        })
    }
}

/// A successful classification, as consumed by the client.
#[derive(Debug, Clone, PartialEq)]
pub struct ClassificationResult {
    pub predicted_class: Option<GradeValue>,
    pub confidence: f64,
    pub class_labels: Vec<GradeValue>,
    pub class_probabilities: Vec<f64>,
    pub model_name: Option<String>,
    pub inference_ms: Option<f64>,
    pub test_accuracy: Option<f64>,
}

impl ClassificationResult {
    pub fn grade(&self) -> (KlGrade, GradeCoercion) {
        GradeValue::coerce(self.predicted_class.as_ref())
    }

    /// Labels paired with their probability, in response order.
    pub fn probabilities(&self) -> impl Iterator<Item = (&GradeValue, f64)> + '_ {
        self.class_labels
            .iter()
            .zip(self.class_probabilities.iter().copied())
    }
}

/// Body of `POST /recommend`: the classification, forwarded.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AdvisoryRequest {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub class: Option<GradeValue>,
    pub confidence: f64,
    pub probs: Vec<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub model: Option<String>,
    pub inference_ms: f64,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub test_acc: Option<f64>,
}

impl AdvisoryRequest {
    pub fn from_classification(result: &ClassificationResult, latency_ms: f64) -> Self {
        Self {
            class: result.predicted_class.clone(),
            confidence: result.confidence,
            probs: result.class_probabilities.clone(),
            model: result.model_name.clone(),
            inference_ms: latency_ms,
            test_acc: result.test_accuracy,
        }
    }
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct AdvisoryResponse {
    #[serde(default)]
    pub ok: bool,
    #[serde(default)]
    pub advice: Option<String>,
    #[serde(default)]
    pub error: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AdvisoryResult {
    pub advice_text: String,
    pub ok: bool,
}

impl AdvisoryResponse {
    pub fn parse(body: &str) -> Result<AdvisoryResult, ContractError> {
        serde_json::from_str::<AdvisoryResponse>(body)
            .map_err(|e| ContractError::Malformed(e.to_string()))?
            .into_result()
    }

    pub fn into_result(self) -> Result<AdvisoryResult, ContractError> {
        if !self.ok {
            return Err(ContractError::Rejected(self.error));
        }
        Ok(AdvisoryResult {
            advice_text: self.advice.unwrap_or_default(),
            ok: true,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const SAMPLE: &str = r#"{
        "ok": true, "class": 2, "confidence": 0.81,
        "classes": [0, 1, 2, 3, 4],
        "probs": [0.02, 0.05, 0.81, 0.09, 0.03],
        "inference_ms": 340, "model": "resnet18"
    }"#;

    #[test]
    fn test_parse_success() {
        let result = PredictResponse::parse(SAMPLE).unwrap();
        assert_eq!(result.grade(), (KlGrade::Kl2, GradeCoercion::Exact));
        assert_eq!(result.inference_ms, Some(340.0));
        assert_eq!(result.model_name.as_deref(), Some("resnet18"));
        assert_eq!(result.test_accuracy, None);

        let pairs: Vec<(String, f64)> = result
            .probabilities()
            .map(|(label, p)| (label.to_string(), p))
            .collect();
        assert_eq!(pairs[2], ("2".to_string(), 0.81));
        assert_eq!(pairs.len(), 5);
    }

    #[test]
    fn test_parse_string_labels_from_reference_service() {
        let body = r#"{"ok":true,"class":"3","confidence":0.5,
            "classes":["0","1","2","3","4"],"probs":[0.1,0.1,0.1,0.5,0.2],
            "model":"ResNet18","inference_ms":12.5,"test_acc":0.678}"#;
        let result = PredictResponse::parse(body).unwrap();
        assert_eq!(result.grade().0, KlGrade::Kl3);
        assert_eq!(result.test_accuracy, Some(0.678));
        assert_eq!(result.class_labels[4], GradeValue::from("4"));
    }

    #[test]
    fn test_non_numeric_latency_is_absent() {
        let body = r#"{"ok":true,"class":1,"confidence":0.9,"inference_ms":"fast"}"#;
        let result = PredictResponse::parse(body).unwrap();
        assert_eq!(result.inference_ms, None);
        assert!(result.class_labels.is_empty());
    }

    #[test]
    fn test_non_scalar_class_falls_back_to_kl0() {
        for class in ["true", "[2]", "{}"] {
            let body = format!(r#"{{"ok":true,"class":{},"confidence":0.5,"model":"m"}}"#, class);
            let result = PredictResponse::parse(&body).unwrap();
            assert_eq!(result.grade(), (KlGrade::Kl0, GradeCoercion::NotNumeric));
            assert_eq!(result.model_name.as_deref(), Some("m"));
        }

        let result = PredictResponse::parse(r#"{"ok":true,"class":null}"#).unwrap();
        assert_eq!(result.predicted_class, None);
    }

    #[test]
    fn test_numeric_strings_and_null_probabilities() {
        let body = r#"{"ok":true,"class":2,"confidence":"0.81",
            "classes":[0,1,2],"probs":[0.5,null,"0.25"],"test_acc":"n/a"}"#;
        let result = PredictResponse::parse(body).unwrap();
        assert_eq!(result.confidence, 0.81);
        assert_eq!(result.class_probabilities, vec![0.5, 0.0, 0.25]);
        assert_eq!(result.test_accuracy, None);
    }

    #[test]
    fn test_rejection_carries_server_message() {
        let err = PredictResponse::parse(r#"{"ok":false,"error":"Không thấy file ảnh."}"#)
            .unwrap_err();
        assert_eq!(err, ContractError::Rejected(Some("Không thấy file ảnh.".into())));

        let err = PredictResponse::parse(r#"{"ok":false}"#).unwrap_err();
        assert_eq!(err, ContractError::Rejected(None));
    }

    #[test]
    fn test_misaligned_arrays_are_malformed() {
        let body = r#"{"ok":true,"class":1,"classes":[0,1,2],"probs":[0.5,0.5]}"#;
        assert!(matches!(
            PredictResponse::parse(body),
            Err(ContractError::Malformed(_))
        ));
    }

    #[test]
    fn test_unparseable_body_is_malformed() {
        assert!(matches!(
            PredictResponse::parse("<html>502 Bad Gateway</html>"),
            Err(ContractError::Malformed(_))
        ));
    }

    #[test]
    fn test_advisory_request_forwards_classification() {
        let result = PredictResponse::parse(SAMPLE).unwrap();
        let request = AdvisoryRequest::from_classification(&result, 340.0);
        let json = serde_json::to_value(&request).unwrap();

        assert_eq!(json["class"], serde_json::json!(2));
        assert_eq!(json["model"], "resnet18");
        assert_eq!(json["inference_ms"], 340.0);
        assert!(json.get("test_acc").is_none());
    }

    #[test]
    fn test_advisory_response() {
        let ok = AdvisoryResponse::parse(r#"{"ok":true,"advice":"Tập đi bộ nhẹ."}"#).unwrap();
        assert_eq!(ok.advice_text, "Tập đi bộ nhẹ.");
        assert!(ok.ok);

        let err = AdvisoryResponse::parse(r#"{"ok":false,"error":"quota"}"#).unwrap_err();
        assert_eq!(err, ContractError::Rejected(Some("quota".into())));
    }
}
