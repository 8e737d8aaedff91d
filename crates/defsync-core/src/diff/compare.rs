//! Equality predicates used by the diff engine.
//!
//! These deliberately do not implement `PartialEq` semantics: each one
//! compares exactly the properties its emission phase is responsible for.
//! `have_same_column_definition` ignores `AUTO_INCREMENT` and uniqueness
//! because those are handled by later phases, and several predicates
//! accommodate the canonicalised forms a live database reports back.

use crate::dialect::Dialect;
use crate::schema::{
    CheckDefinition, Column, ColumnKeyOption, DefaultDefinition, ForeignKey, Index, Policy, Table,
    Value,
};

/// Column sameness for the `CHANGE COLUMN` decision (MySQL-like).
///
/// `PRIMARY KEY` implies `NOT NULL` on the desired side; charset and
/// collation only fire when the desired column sets them explicitly.
pub(crate) fn have_same_column_definition(
    dialect: Dialect,
    current: &Column,
    desired: &Column,
) -> bool {
    have_same_data_type(dialect, current, desired)
        && current.unsigned == desired.unsigned
        && (current.not_null == Some(true))
            == (desired.not_null == Some(true) || desired.key_option == ColumnKeyOption::Primary)
        && current.timezone == desired.timezone
        && are_same_check_definition(current.check.as_ref(), desired.check.as_ref())
        && (desired.charset.is_none() || current.charset == desired.charset)
        && (desired.collate.is_none() || current.collate == desired.collate)
        && current.on_update == desired.on_update
}

/// Data-type sameness: normalized names, array flag, and lengths when both
/// sides set one explicitly. An unset length matches anything.
pub(crate) fn have_same_data_type(dialect: Dialect, current: &Column, desired: &Column) -> bool {
    dialect.normalize_data_type(&current.type_name)
        == dialect.normalize_data_type(&desired.type_name)
        && match (&current.length, &desired.length) {
            (Some(current_length), Some(desired_length)) => {
                length_of(current_length) == length_of(desired_length)
            }
            _ => true,
        }
        && current.array == desired.array
}

fn length_of(value: &Value) -> i64 {
    match value {
        Value::Int { value, .. } => *value,
        _ => 0,
    }
}

/// Check-constraint sameness compares the definition text only.
pub(crate) fn are_same_check_definition(
    current: Option<&CheckDefinition>,
    desired: Option<&CheckDefinition>,
) -> bool {
    match (current, desired) {
        (None, None) => true,
        (Some(current), Some(desired)) => current.definition == desired.definition,
        _ => false,
    }
}

/// Default sameness with `DEFAULT NULL` erased on both sides: introspection
/// reports an explicit null default for columns declared without one.
pub(crate) fn are_same_default_value(
    current: Option<&DefaultDefinition>,
    desired: Option<&DefaultDefinition>,
) -> bool {
    let current = current.map(|d| &d.value).filter(|v| !v.is_null_arg());
    let desired = desired.map(|d| &d.value).filter(|v| !v.is_null_arg());
    are_same_value(current, desired)
}

/// Raw-text value comparison with one accommodation: a float reported back
/// with more digits than desired is truncated to the desired length, so
/// `0.00` compares equal to `0.0`.
pub(crate) fn are_same_value(current: Option<&Value>, desired: Option<&Value>) -> bool {
    let (current, desired) = match (current, desired) {
        (None, None) => return true,
        (Some(current), Some(desired)) => (current, desired),
        _ => return false,
    };

    let mut current_raw = current.raw();
    let desired_raw = desired.raw();
    if matches!(desired, Value::Float { .. }) && current_raw.len() > desired_raw.len() {
        current_raw = current_raw
            .get(..desired_raw.len())
            .unwrap_or(current_raw);
    }
    current_raw == desired_raw
}

/// Primary-key sameness: both absent, or both present and the same index.
pub(crate) fn are_same_primary_keys(current: Option<&Index>, desired: Option<&Index>) -> bool {
    match (current, desired) {
        (Some(current), Some(desired)) => are_same_indexes(current, desired),
        (None, None) => true,
        _ => false,
    }
}

/// Index sameness: flags, column sequence, partial-index predicate, and
/// every desired option matching a current option of the same name.
pub(crate) fn are_same_indexes(current: &Index, desired: &Index) -> bool {
    if current.unique != desired.unique || current.primary != desired.primary {
        return false;
    }
    if current.columns.len() != desired.columns.len() {
        return false;
    }
    for (current_column, desired_column) in current.columns.iter().zip(&desired.columns) {
        if current_column.column != desired_column.column {
            return false;
        }
    }
    if current.where_clause != desired.where_clause {
        return false;
    }

    for desired_option in &desired.options {
        match current.option(&desired_option.name) {
            Some(current_option) => {
                if !are_same_value(Some(&current_option.value), Some(&desired_option.value)) {
                    return false;
                }
            }
            None => return false,
        }
    }

    true
}

/// Foreign-key sameness compares the normalized referential actions only.
pub(crate) fn are_same_foreign_keys(
    dialect: Dialect,
    current: &ForeignKey,
    desired: &ForeignKey,
) -> bool {
    dialect.normalize_ref_action(&current.on_update)
        == dialect.normalize_ref_action(&desired.on_update)
        && dialect.normalize_ref_action(&current.on_delete)
            == dialect.normalize_ref_action(&desired.on_delete)
}

/// Policy sameness under case folding, with roles compared as sorted sets.
///
/// When the `using` / `with_check` texts differ case-insensitively, the
/// result falls back to comparing the parenthesized current text against
/// the desired text verbatim; introspection wraps the expression in
/// parentheses the declaration may not carry.
pub(crate) fn are_same_policies(current: &Policy, desired: &Policy) -> bool {
    if !current.scope.eq_ignore_ascii_case(&desired.scope) {
        return false;
    }
    if !current.permissive.eq_ignore_ascii_case(&desired.permissive) {
        return false;
    }
    if !current.using.eq_ignore_ascii_case(&desired.using) {
        return format!("({})", current.using) == desired.using;
    }
    if !current.with_check.eq_ignore_ascii_case(&desired.with_check) {
        return format!("({})", current.with_check) == desired.with_check;
    }
    if current.roles.len() != desired.roles.len() {
        return false;
    }

    let mut current_roles = current.roles.clone();
    let mut desired_roles = desired.roles.clone();
    current_roles.sort();
    desired_roles.sort();
    current_roles
        .iter()
        .zip(&desired_roles)
        .all(|(current_role, desired_role)| current_role.eq_ignore_ascii_case(desired_role))
}

/// Effective nullability: unset resolves to NOT NULL only for Postgres
/// serial types, which are implicitly NOT NULL.
pub(crate) fn not_null(dialect: Dialect, column: &Column) -> bool {
    match column.not_null {
        Some(explicit) => explicit,
        None => {
            dialect == Dialect::Postgres
                && (column.type_name == "serial" || column.type_name == "bigserial")
        }
    }
}

/// Whether a column participates in the table's primary key, either via
/// its inline key option or a primary index covering it.
pub(crate) fn is_primary_key(column: &Column, table: &Table) -> bool {
    if column.key_option == ColumnKeyOption::Primary {
        return true;
    }
    table
        .indexes
        .iter()
        .filter(|index| index.primary)
        .any(|index| index.columns.iter().any(|c| c.column == column.name))
}
