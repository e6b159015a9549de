mod test_candidate_handling;
mod test_duplicate_snapshots;
mod test_early_candidate;
mod test_store_offline;
mod test_unknown_record_type;
