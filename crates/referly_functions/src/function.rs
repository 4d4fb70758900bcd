//! Function routing by deployed name

use crate::error::FunctionError;
use crate::gateway::ChatCompletion;
use crate::http::{FunctionRequest, FunctionResponse};
use crate::{linkedin, resume, salary};
use std::fmt;
use std::str::FromStr;

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum Function {
    Resume,
    Linkedin,
    Salary,
}

impl Function {
    pub const ALL: [Function; 3] = [Function::Resume, Function::Linkedin, Function::Salary];

    /// Deployed name
    pub fn name(self) -> &'static str {
        match self {
            Function::Resume => "parse-resume",
            Function::Linkedin => "linkedin-import",
            Function::Salary => "salary-intelligence",
        }
    }

    pub fn uses_gateway(self) -> bool {
        !matches!(self, Function::Linkedin)
    }

    /// Run the handler. Never fails; errors come back as error responses.
    pub async fn dispatch<G: ChatCompletion>(
        self,
        request: &FunctionRequest,
        gateway: &G,
    ) -> FunctionResponse {
        tracing::debug!(function = self.name(), method = ?request.method, "dispatching");
        match self {
            Function::Resume => resume::handle(request, gateway).await,
            Function::Linkedin => linkedin::handle(request).await,
            Function::Salary => salary::handle(request, gateway).await,
        }
    }
}

impl fmt::Display for Function {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for Function {
    type Err = FunctionError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Function::ALL
            .into_iter()
            .find(|f| f.name() == s.trim())
            .ok_or_else(|| {
                let names: Vec<_> = Function::ALL.iter().map(|f| f.name()).collect();
                FunctionError::validation(format!(
                    "unknown function '{s}' (expected one of: {})",
                    names.join(", ")
                ))
            })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn names_round_trip() {
        for function in Function::ALL {
            assert_eq!(function.name().parse::<Function>().unwrap(), function);
        }
        assert!("resume".parse::<Function>().is_err());
    }
}
