mod remove_tracked_files;
