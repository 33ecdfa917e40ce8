//! Schema merge: difference detection, token ordering and execution

pub mod context;
pub mod factory;
pub mod filters;
pub mod merger;
pub mod report;
pub mod sorter;
pub mod token;
pub mod validation;
pub mod value_for_null;

pub use context::{ExecutionReport, MergerContext, TokenOutcome, TokenStatus};
pub use factory::{
    factory_with_adapter, merger_factory, DerbyMergerFactory, GenericMergerFactory,
    H2MergerFactory, HsqlMergerFactory, MergerTokenFactory, MySqlMergerFactory,
    OracleMergerFactory, PostgresMergerFactory, SqlServerMergerFactory,
};
pub use filters::FiltersConfig;
pub use merger::{reference_graph, DbMerger, DbMergerBuilder, MergePlan};
pub use sorter::TokenSorter;
pub use token::{Executed, MergeDirection, MergerToken, TokenKind};
pub use validation::{ValidationFailure, ValidationResult};
pub use value_for_null::{EmptyValueForNull, MapValueForNull, ValueForNullProvider};
