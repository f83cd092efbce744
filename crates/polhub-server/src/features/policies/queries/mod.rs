pub mod aggregate_policies;
pub mod search_user;

pub use aggregate_policies::{
    AggregatePoliciesError, AggregatePoliciesQuery, AggregatePoliciesResponse,
};
pub use search_user::{SearchUserError, SearchUserQuery, SearchUserResponse};
