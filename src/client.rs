pub(crate) mod actinia;
pub(crate) mod routes;
pub(crate) mod session;
