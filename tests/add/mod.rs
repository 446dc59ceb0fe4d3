mod removing_deleted_files_from_index_successfully;
