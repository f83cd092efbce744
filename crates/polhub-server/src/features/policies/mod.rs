pub mod queries;
pub mod routes;

pub use queries::{
    AggregatePoliciesQuery, AggregatePoliciesResponse, SearchUserQuery, SearchUserResponse,
};
