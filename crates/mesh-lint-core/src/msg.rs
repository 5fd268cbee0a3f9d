//! Typed constructors for the built-in message kinds.

use crate::diag::catalog::{
    INTERNAL_ERROR, INVALID_REGEXP, REFERENCED_RESOURCE_NOT_FOUND, SCHEMA_VALIDATION_ERROR,
    SCHEMA_WARNING, VIRTUAL_SERVICE_HOST_NOT_FOUND_IN_GATEWAY,
};
use crate::diag::{Message, MessageCatalog, Param};
use crate::resource::Resource;
use std::sync::Arc;

fn build(catalog: &MessageCatalog, name: &str, r: Option<&Arc<Resource>>, params: Vec<Param>) -> Message {
    Message::new(catalog.get_or_internal(name), r.cloned(), params)
}

/// `IST0001`: an unexpected failure inside the toolchain.
#[must_use]
pub fn internal_error(catalog: &MessageCatalog, r: Option<&Arc<Resource>>, detail: &str) -> Message {
    build(catalog, INTERNAL_ERROR, r, vec![detail.into()])
}

/// `IST0101`: a referenced resource does not exist.
#[must_use]
pub fn referenced_resource_not_found(
    catalog: &MessageCatalog,
    r: Option<&Arc<Resource>>,
    reftype: &str,
    refval: &str,
) -> Message {
    build(
        catalog,
        REFERENCED_RESOURCE_NOT_FOUND,
        r,
        vec![reftype.into(), refval.into()],
    )
}

/// `IST0106`: the resource failed schema validation.
#[must_use]
pub fn schema_validation_error(catalog: &MessageCatalog, r: Option<&Arc<Resource>>, err: &str) -> Message {
    build(catalog, SCHEMA_VALIDATION_ERROR, r, vec![err.into()])
}

/// `IST0122`: a regex-typed match does not compile.
#[must_use]
pub fn invalid_regexp(
    catalog: &MessageCatalog,
    r: Option<&Arc<Resource>>,
    field: &str,
    pattern: &str,
    problem: &str,
) -> Message {
    build(
        catalog,
        INVALID_REGEXP,
        r,
        vec![field.into(), pattern.into(), problem.into()],
    )
}

/// `IST0132`: none of a virtual service's hosts is served by a gateway.
#[must_use]
pub fn virtual_service_host_not_found_in_gateway(
    catalog: &MessageCatalog,
    r: Option<&Arc<Resource>>,
    hosts: &[String],
    virtual_service: &str,
    gateway: &str,
) -> Message {
    build(
        catalog,
        VIRTUAL_SERVICE_HOST_NOT_FOUND_IN_GATEWAY,
        r,
        vec![hosts.into(), virtual_service.into(), gateway.into()],
    )
}

/// `IST0133`: the resource has a schema warning.
#[must_use]
pub fn schema_warning(catalog: &MessageCatalog, r: Option<&Arc<Resource>>, err: &str) -> Message {
    build(catalog, SCHEMA_WARNING, r, vec![err.into()])
}
