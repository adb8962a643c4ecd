// self
use crate::_prelude::*;

/// HTTP request methods an endpoint may use.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum HttpMethod {
	#[default]
	/// `GET`
	Get,
	/// `POST`
	Post,
	/// `PUT`
	Put,
	/// `DELETE`
	Delete,
	/// `CONNECT`
	Connect,
	/// `OPTIONS`
	Options,
	/// `TRACE`
	Trace,
	/// `PATCH`
	Patch,
}
impl HttpMethod {
	/// Returns the wire name of the method.
	pub const fn as_str(self) -> &'static str {
		match self {
			HttpMethod::Get => "GET",
			HttpMethod::Post => "POST",
			HttpMethod::Put => "PUT",
			HttpMethod::Delete => "DELETE",
			HttpMethod::Connect => "CONNECT",
			HttpMethod::Options => "OPTIONS",
			HttpMethod::Trace => "TRACE",
			HttpMethod::Patch => "PATCH",
		}
	}
}
impl Display for HttpMethod {
	fn fmt(&self, f: &mut Formatter) -> FmtResult {
		f.write_str(self.as_str())
	}
}
impl FromStr for HttpMethod {
	type Err = UnknownHttpMethod;

	fn from_str(s: &str) -> Result<Self, Self::Err> {
		Ok(match s {
			"GET" => HttpMethod::Get,
			"POST" => HttpMethod::Post,
			"PUT" => HttpMethod::Put,
			"DELETE" => HttpMethod::Delete,
			"CONNECT" => HttpMethod::Connect,
			"OPTIONS" => HttpMethod::Options,
			"TRACE" => HttpMethod::Trace,
			"PATCH" => HttpMethod::Patch,
			other => return Err(UnknownHttpMethod(other.to_owned())),
		})
	}
}

/// Error returned when parsing an unsupported method name.
#[derive(Clone, Debug, PartialEq, Eq, ThisError)]
#[error("Unsupported HTTP method `{0}`.")]
pub struct UnknownHttpMethod(pub String);
