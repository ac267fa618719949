//! Success classification for the site's heterogeneous response shapes.
//!
//! The web UI signals success in several unrelated encodings: a nested
//! `Data.Status` field carrying the string `"OK"` on some endpoints and the
//! integer `0` on others, a bare `Url` field, an `IsSuccess` boolean, or a
//! status code with no usable body at all. Each server operation is permanently
//! associated with exactly one [`OutcomeShape`]; the association lives in a
//! static table ([`OpKind::expected_shape`](crate::client::ops::OpKind::expected_shape))
//! so an unrecognized shape cannot be passed at runtime.

// crates.io
use serde_json::Value;
// self
use crate::http::Response;

/// Closed set of success rules used by the site's endpoints.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum OutcomeShape {
	/// Success iff the nested `Data.Status` field equals the string `"OK"` exactly.
	JsonDataStatusOk,
	/// Success iff the nested `Data.Status` field equals the JSON integer `0`.
	///
	/// The string `"0"` does not qualify; a different family of endpoints genuinely
	/// encodes its status as a number rather than as `"OK"`.
	JsonDataStatusZero,
	/// Success iff a top-level `Url` field is present, regardless of its value.
	JsonUrl,
	/// Success iff a top-level `IsSuccess` field equals boolean `true`.
	JsonIsSuccessTrue,
	/// Success iff the status code is exactly 200; the body is never inspected.
	Status200,
	/// Success iff the status code is exactly 400; the body is never inspected.
	///
	/// No shipped operation currently binds to this shape, but the site declares
	/// it and a future operation may rely on it.
	Status400,
}
impl OutcomeShape {
	/// Decides whether `response` counts as a success under this shape.
	///
	/// Never fails: malformed JSON, a missing field, or a value of the wrong type
	/// all classify as unsuccessful. The response body is borrowed, never
	/// consumed, so callers can still extract a payload from a classified
	/// response afterwards.
	pub fn classify(self, response: &Response) -> bool {
		match self {
			Self::JsonDataStatusOk =>
				data_status(response) == Some(Value::String("OK".to_owned())),
			Self::JsonDataStatusZero =>
				data_status(response).as_ref().and_then(Value::as_i64) == Some(0),
			Self::JsonUrl => body_json(response).is_some_and(|body| body.get("Url").is_some()),
			Self::JsonIsSuccessTrue =>
				body_json(response).and_then(|body| body.get("IsSuccess")?.as_bool())
					== Some(true),
			Self::Status200 => response.status() == 200,
			Self::Status400 => response.status() == 400,
		}
	}

	/// Returns a stable label suitable for span or metric fields.
	pub const fn as_str(self) -> &'static str {
		match self {
			Self::JsonDataStatusOk => "json_data_status_ok",
			Self::JsonDataStatusZero => "json_data_status_zero",
			Self::JsonUrl => "json_url",
			Self::JsonIsSuccessTrue => "json_issuccess_true",
			Self::Status200 => "status_200",
			Self::Status400 => "status_400",
		}
	}
}

fn body_json(response: &Response) -> Option<Value> {
	serde_json::from_slice(response.body()).ok()
}

fn data_status(response: &Response) -> Option<Value> {
	body_json(response)?.get("Data")?.get("Status").cloned()
}

#[cfg(test)]
mod tests {
	// self
	use super::*;

	fn json_response(body: &str) -> Response {
		Response::new(200, body.as_bytes().to_vec())
	}

	#[test]
	fn data_status_ok_requires_exact_match() {
		let shape = OutcomeShape::JsonDataStatusOk;

		assert!(shape.classify(&json_response(r#"{"Data":{"Status":"OK"}}"#)));
		assert!(!shape.classify(&json_response(r#"{"Data":{"Status":"ok"}}"#)));
		assert!(!shape.classify(&json_response(r#"{"Data":{"Status":0}}"#)));
		assert!(!shape.classify(&json_response(r#"{"Data":{}}"#)));
	}

	#[test]
	fn data_status_zero_rejects_string_encoding() {
		let shape = OutcomeShape::JsonDataStatusZero;

		assert!(shape.classify(&json_response(r#"{"Data":{"Status":0}}"#)));
		assert!(!shape.classify(&json_response(r#"{"Data":{"Status":"0"}}"#)));
		assert!(!shape.classify(&json_response(r#"{"Data":{"Status":1}}"#)));
		assert!(!shape.classify(&json_response(r#"{"Data":{"Status":"OK"}}"#)));
	}

	#[test]
	fn url_shape_accepts_any_value() {
		let shape = OutcomeShape::JsonUrl;

		assert!(shape.classify(&json_response(r#"{"Url":"https://upload.example/1"}"#)));
		assert!(shape.classify(&json_response(r#"{"Url":null}"#)));
		assert!(!shape.classify(&json_response(r#"{"url":"lowercase-key"}"#)));
		assert!(!shape.classify(&json_response("{}")));
	}

	#[test]
	fn issuccess_shape_requires_boolean_true() {
		let shape = OutcomeShape::JsonIsSuccessTrue;

		assert!(shape.classify(&json_response(r#"{"IsSuccess":true}"#)));
		assert!(!shape.classify(&json_response(r#"{"IsSuccess":false}"#)));
		assert!(!shape.classify(&json_response(r#"{"IsSuccess":1}"#)));
		assert!(!shape.classify(&json_response(r#"{"IsSuccess":"true"}"#)));
	}

	#[test]
	fn json_shapes_never_fail_on_garbage_bodies() {
		for shape in [
			OutcomeShape::JsonDataStatusOk,
			OutcomeShape::JsonDataStatusZero,
			OutcomeShape::JsonUrl,
			OutcomeShape::JsonIsSuccessTrue,
		] {
			assert!(!shape.classify(&json_response("<html>not json</html>")));
			assert!(!shape.classify(&json_response("")));
			assert!(!shape.classify(&Response::new(500, b"\xff\xfe".to_vec())));
		}
	}

	#[test]
	fn status_shapes_ignore_the_body() {
		assert!(OutcomeShape::Status200.classify(&Response::new(200, b"garbage".to_vec())));
		assert!(!OutcomeShape::Status200.classify(&Response::new(500, Vec::new())));
		assert!(OutcomeShape::Status400.classify(&Response::new(400, Vec::new())));
		assert!(!OutcomeShape::Status400.classify(&Response::new(200, Vec::new())));
	}

	#[test]
	fn classification_leaves_the_body_readable() {
		let response = json_response(r#"{"Url":"https://upload.example/2"}"#);

		assert!(OutcomeShape::JsonUrl.classify(&response));
		assert_eq!(response.body(), br#"{"Url":"https://upload.example/2"}"#);
		assert!(response.text().contains("upload.example"));
	}
}
