//! Stable names shared with the runtime loader
//!
//! Every constant in here is a wire contract: the loader looks these names
//! up verbatim in the output module, so none of them may change without a
//! matching loader release.

/// Named list with one record per exported variable
pub const RS_EXPORT_VAR_MN: &str = "#rs_export_var";

/// Named list with one record per reference-counted variable slot
pub const RS_OBJECT_SLOTS_MN: &str = "#rs_object_slots";

/// Named list with one record per exported function
pub const RS_EXPORT_FUNC_MN: &str = "#rs_export_func";

/// Named list with one record per exported kernel
pub const RS_EXPORT_FOREACH_MN: &str = "#rs_export_foreach";

/// Named list with one record per exported record type
pub const RS_EXPORT_TYPE_MN: &str = "#rs_export_type";

/// Prefix of synthesized trampoline functions
pub const HELPER_FUNCTION_PREFIX: &str = ".helper_";

/// Prefix of per-record field descriptor lists
pub const STRUCT_INFO_PREFIX: &str = "%";

/// Function-name prefix reserved for the runtime library
pub const RESERVED_FUNCTION_PREFIX: &str = "rs";

/// Name of the trampoline generated for an exported function
pub fn helper_function_name(function_name: &str) -> String {
    format!("{HELPER_FUNCTION_PREFIX}{function_name}")
}

/// Name of the field descriptor list for a record type
pub fn struct_info_name(record_name: &str) -> String {
    format!("{STRUCT_INFO_PREFIX}{record_name}")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_helper_name_transform() {
        assert_eq!(helper_function_name("bar"), ".helper_bar");
    }

    #[test]
    fn test_struct_info_name_transform() {
        assert_eq!(struct_info_name("point"), "%point");
    }
}
