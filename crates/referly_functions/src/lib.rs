//! Referly Functions
//!
//! The three serverless functions behind the dashboard widgets. Each is a
//! stateless, single-attempt handler: validate the JSON body, build a
//! prompt, ask the chat-completion gateway for a JSON reply, strip any
//! Markdown fences, parse, and answer.
//!
//! | Function | Name | Calls the gateway |
//! |---|---|---|
//! | [`resume`] | `parse-resume` | yes |
//! | [`linkedin`] | `linkedin-import` | no |
//! | [`salary`] | `salary-intelligence` | yes |
//!
//! Handlers take a [`FunctionRequest`] and always produce a
//! [`FunctionResponse`]; failures are rendered as
//! `{"success": false, "error": "..."}` with
//! the status from [`FunctionError::status`].
//!
//! # Example
//!
//! ```ignore
//! use referly_functions::{Function, FunctionRequest, GatewayConfig, HttpGateway};
//!
//! let gateway = HttpGateway::new(GatewayConfig::from_env())?;
//! let request = FunctionRequest::post(r#"{"resumeText": "..."}"#);
//! let response = Function::Resume.dispatch(&request, &gateway).await;
//! println!("{} {}", response.status, response.body);
//! ```

pub mod config;
pub mod error;
pub mod fence;
pub mod function;
pub mod gateway;
pub mod http;
pub mod linkedin;
pub mod resume;
pub mod salary;

mod lenient;

pub use config::GatewayConfig;
pub use error::{FunctionError, Result};
pub use fence::{parse_fenced_json, strip_code_fences};
pub use function::Function;
pub use gateway::{ChatCompletion, ChatMessage, ChatRequest, HttpGateway, Role};
pub use http::{cors_headers, FunctionRequest, FunctionResponse, Method};
