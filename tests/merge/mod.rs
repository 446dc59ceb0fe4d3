mod merge_fast_forward;
mod merge_with_conflicts;
mod merge_abort;
