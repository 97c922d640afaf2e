/*!
# while_lib

A static analyzer for the While language based on abstract interpretation.

A source program is parsed into an abstract syntax tree (see the [`frontend`]
and [`syntax`] modules) and then interpreted under one or more abstract
domains (see the [`abstract_domain`] module). The result of such an
interpretation is, for every program variable, a sound over-approximation of
the set of values the variable may hold at program exit. A concrete
interpreter sharing the same syntax tree is provided for reference in
[`analysis::concrete`].
*/

use std::collections::BTreeMap;

use crate::abstract_domain::{
    AbstractState, BlackHoleDomain, IntervalDomain, ModuloDomain, SignDomain,
    SymmetricIntervalDomain, ValueDomain,
};
use crate::syntax::Stm;

pub mod abstract_domain;
pub mod analysis;
pub mod frontend;
pub mod syntax;
pub mod utils;

mod prelude {
    pub use anyhow::{anyhow, Context as _, Error};
    pub use serde::{Deserialize, Serialize};
}

use crate::prelude::*;

/// The generic function signature for running one abstract domain over a program.
///
/// The returned map contains the textual rendering of the final abstract value
/// for every variable of the program.
pub type DomainRunFn = fn(&Stm) -> BTreeMap<String, String>;

/// A structure describing one runnable abstract-domain instantiation,
/// including the function to be called to run the analysis.
pub struct DomainModule {
    /// The name of the domain as presented to the user.
    pub name: &'static str,
    /// The monomorphized analysis entry point.
    pub run: DomainRunFn,
}

impl DomainModule {
    /// Interpret `program` under this domain and package the result.
    pub fn analyze(&self, program: &Stm) -> AnalysisResult {
        AnalysisResult {
            domain: self.name.to_string(),
            bindings: (self.run)(program),
        }
    }
}

impl std::fmt::Display for DomainModule {
    fn fmt(&self, formatter: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(formatter, "{}", self.name)
    }
}

/// Get a list of all known abstract-domain instantiations.
pub fn get_domain_modules() -> Vec<DomainModule> {
    vec![
        DomainModule {
            name: "BlackHole",
            run: run_in_domain::<BlackHoleDomain>,
        },
        DomainModule {
            name: "Sign",
            run: run_in_domain::<SignDomain>,
        },
        DomainModule {
            name: "Interval",
            run: run_in_domain::<IntervalDomain>,
        },
        DomainModule {
            name: "SInterval",
            run: run_in_domain::<SymmetricIntervalDomain>,
        },
        DomainModule {
            name: "Modulo-2",
            run: run_in_domain::<ModuloDomain<2>>,
        },
        DomainModule {
            name: "Modulo-3",
            run: run_in_domain::<ModuloDomain<3>>,
        },
    ]
}

/// Interpret `program` under the domain `T` starting from the empty state
/// and render the resulting bindings.
fn run_in_domain<T: ValueDomain>(program: &Stm) -> BTreeMap<String, String> {
    let state: AbstractState<T> = analysis::interpreter::interpret_program(program);
    state
        .iter()
        .map(|(var, value)| (var.clone(), value.to_string()))
        .collect()
}

/// The result of interpreting a program under a single abstract domain.
#[derive(Serialize, Deserialize, Debug, PartialEq, Eq, Clone)]
pub struct AnalysisResult {
    /// The name of the abstract domain that produced the result.
    pub domain: String,
    /// The rendered final abstract value for every variable of the program.
    pub bindings: BTreeMap<String, String>,
}

impl std::fmt::Display for AnalysisResult {
    /// Print the result as `<domain> domain: [x -> value, y -> value]`.
    fn fmt(&self, formatter: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        use itertools::Itertools as _;
        write!(
            formatter,
            "{} domain: [{}]",
            self.domain,
            self.bindings
                .iter()
                .map(|(var, value)| format!("{var} -> {value}"))
                .join(", ")
        )
    }
}
