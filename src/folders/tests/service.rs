mod create_folder_tests {
    use uuid::Uuid;

    use crate::model::error::folder_errors::FolderError;
    use crate::test::*;

    #[test]
    fn create_folder_trims_name() {
        let service = test_service();
        let folder = service.create_folder(USER, "  docs \t", None).unwrap();
        assert_eq!("docs", folder.name);
        cleanup();
    }

    #[test]
    fn create_folder_blank_name() {
        let service = test_service();
        let res = service.create_folder(USER, "   ", None).unwrap_err();
        assert_eq!(
            FolderError::Validation("Folder name cannot be empty.".to_string()),
            res
        );
        cleanup();
    }

    #[test]
    fn create_folder_name_length_limit() {
        let service = test_service();
        let longest = "a".repeat(255);
        service.create_folder(USER, &longest, None).unwrap();
        let res = service
            .create_folder(USER, &"a".repeat(256), None)
            .unwrap_err();
        assert!(matches!(res, FolderError::Validation(_)));
        cleanup();
    }

    #[test]
    fn create_folder_counts_characters_not_bytes() {
        let service = test_service();
        // 255 characters, but far more than 255 bytes
        let name = "é".repeat(255);
        let folder = service.create_folder(USER, &name, None).unwrap();
        assert_eq!(name, folder.name);
        cleanup();
    }

    #[test]
    fn create_folder_missing_parent() {
        let service = test_service();
        let res = service
            .create_folder(USER, "docs", Some(Uuid::new_v4()))
            .unwrap_err();
        assert_eq!(FolderError::InvalidParent, res);
        cleanup();
    }

    #[test]
    fn create_folder_duplicate_after_trim() {
        let service = test_service();
        service.create_folder(USER, "docs", None).unwrap();
        let res = service.create_folder(USER, " docs ", None).unwrap_err();
        assert_eq!(FolderError::DuplicateName, res);
        cleanup();
    }
}

mod rename_folder_tests {
    use uuid::Uuid;

    use crate::model::error::folder_errors::FolderError;
    use crate::test::*;

    #[test]
    fn rename_folder_works() {
        let service = test_service();
        let folder = service.create_folder(USER, "old", None).unwrap();
        let renamed = service.rename_folder(USER, folder.id, " new ").unwrap();
        assert_eq!("new", renamed.name);
        assert_eq!(folder.id, renamed.id);
        cleanup();
    }

    #[test]
    fn rename_folder_to_same_name() {
        let service = test_service();
        let folder = service.create_folder(USER, "same", None).unwrap();
        let renamed = service.rename_folder(USER, folder.id, "same").unwrap();
        assert_eq!("same", renamed.name);
        cleanup();
    }

    #[test]
    fn rename_folder_validates_before_lookup() {
        let service = test_service();
        let res = service
            .rename_folder(USER, Uuid::new_v4(), "")
            .unwrap_err();
        assert!(matches!(res, FolderError::Validation(_)));
        cleanup();
    }

    #[test]
    fn rename_missing_folder() {
        let service = test_service();
        let res = service
            .rename_folder(USER, Uuid::new_v4(), "name")
            .unwrap_err();
        assert_eq!(FolderError::NotFound, res);
        cleanup();
    }
}

mod move_folder_tests {
    use uuid::Uuid;

    use crate::model::error::folder_errors::FolderError;
    use crate::test::*;

    #[test]
    fn move_folder_into_sibling() {
        let service = test_service();
        let a = service.create_folder(USER, "a", None).unwrap();
        let b = service.create_folder(USER, "b", None).unwrap();
        let moved = service.move_folder(USER, b.id, Some(a.id)).unwrap();
        assert_eq!(Some(a.id), moved.parent_id);
        cleanup();
    }

    #[test]
    fn move_folder_to_root() {
        let service = test_service();
        let a = service.create_folder(USER, "a", None).unwrap();
        let b = service.create_folder(USER, "b", Some(a.id)).unwrap();
        let moved = service.move_folder(USER, b.id, None).unwrap();
        assert_eq!(None, moved.parent_id);
        cleanup();
    }

    #[test]
    fn move_folder_into_itself() {
        let service = test_service();
        let a = service.create_folder(USER, "a", None).unwrap();
        let res = service.move_folder(USER, a.id, Some(a.id)).unwrap_err();
        assert_eq!(FolderError::IllegalMove, res);
        cleanup();
    }

    #[test]
    fn move_folder_into_descendant() {
        let service = test_service();
        let a = service.create_folder(USER, "a", None).unwrap();
        let b = service.create_folder(USER, "b", Some(a.id)).unwrap();
        let c = service.create_folder(USER, "c", Some(b.id)).unwrap();
        let res = service.move_folder(USER, a.id, Some(c.id)).unwrap_err();
        assert_eq!(FolderError::IllegalMove, res);
        // nothing moved
        let view = service.get_folder_view(USER, Some(a.id)).unwrap();
        assert_eq!(None, view.folder.unwrap().parent_id);
        cleanup();
    }

    #[test]
    fn move_missing_folder() {
        let service = test_service();
        let a = service.create_folder(USER, "a", None).unwrap();
        let res = service
            .move_folder(USER, Uuid::new_v4(), Some(a.id))
            .unwrap_err();
        assert_eq!(FolderError::NotFound, res);
        cleanup();
    }

    #[test]
    fn move_folder_to_missing_destination() {
        let service = test_service();
        let a = service.create_folder(USER, "a", None).unwrap();
        let res = service
            .move_folder(USER, a.id, Some(Uuid::new_v4()))
            .unwrap_err();
        assert_eq!(FolderError::InvalidDestination, res);
        cleanup();
    }

    #[test]
    fn move_folder_to_other_users_folder() {
        let service = test_service();
        let a = service.create_folder(USER, "a", None).unwrap();
        let theirs = service.create_folder(OTHER_USER, "theirs", None).unwrap();
        let res = service.move_folder(USER, a.id, Some(theirs.id)).unwrap_err();
        assert_eq!(FolderError::InvalidDestination, res);
        cleanup();
    }

    #[test]
    fn move_folder_onto_existing_name() {
        let service = test_service();
        let a = service.create_folder(USER, "a", None).unwrap();
        service.create_folder(USER, "same", Some(a.id)).unwrap();
        let loose = service.create_folder(USER, "same", None).unwrap();
        let res = service.move_folder(USER, loose.id, Some(a.id)).unwrap_err();
        assert_eq!(FolderError::DuplicateName, res);
        cleanup();
    }

    #[test]
    fn move_folder_into_deleted_folder() {
        let service = test_service();
        let a = service.create_folder(USER, "a", None).unwrap();
        let b = service.create_folder(USER, "b", None).unwrap();
        service.delete_folder(USER, a.id).unwrap();
        let res = service.move_folder(USER, b.id, Some(a.id)).unwrap_err();
        assert_eq!(FolderError::InvalidDestination, res);
        cleanup();
    }
}

mod delete_folder_tests {
    use uuid::Uuid;

    use crate::model::error::folder_errors::FolderError;
    use crate::test::*;

    #[test]
    fn delete_folder_hides_subtree() {
        let service = test_service();
        let a = service.create_folder(USER, "a", None).unwrap();
        let b = service.create_folder(USER, "b", Some(a.id)).unwrap();
        service.delete_folder(USER, a.id).unwrap();
        for id in [a.id, b.id] {
            let res = service.get_folder_view(USER, Some(id)).unwrap_err();
            assert_eq!(FolderError::NotFound, res);
        }
        assert!(service.get_all_folders(USER).unwrap().is_empty());
        cleanup();
    }

    #[test]
    fn delete_missing_folder() {
        let service = test_service();
        let res = service.delete_folder(USER, Uuid::new_v4()).unwrap_err();
        assert_eq!(FolderError::NotFound, res);
        cleanup();
    }

    #[test]
    fn delete_other_users_folder() {
        let service = test_service();
        let theirs = service.create_folder(OTHER_USER, "theirs", None).unwrap();
        let res = service.delete_folder(USER, theirs.id).unwrap_err();
        assert_eq!(FolderError::NotFound, res);
        assert_eq!(1, service.get_all_folders(OTHER_USER).unwrap().len());
        cleanup();
    }
}

mod folder_view_tests {
    use uuid::Uuid;

    use crate::folders::models::{Breadcrumb, ROOT_HREF, ROOT_NAME};
    use crate::model::error::folder_errors::FolderError;
    use crate::test::*;

    #[test]
    fn root_view() {
        let service = test_service();
        service.create_folder(USER, "b", None).unwrap();
        service.create_folder(USER, "a", None).unwrap();
        service.create_folder(OTHER_USER, "theirs", None).unwrap();
        let view = service.get_folder_view(USER, None).unwrap();
        assert_eq!(None, view.folder);
        assert_eq!(vec![Breadcrumb::root()], view.breadcrumbs);
        let names: Vec<&str> = view
            .contents
            .folders
            .iter()
            .map(|f| f.name.as_str())
            .collect();
        assert_eq!(vec!["a", "b"], names);
        assert_eq!(2, view.total_folders);
        assert_eq!(0, view.total_files);
        assert!(view.contents.files.is_empty());
        cleanup();
    }

    #[test]
    fn breadcrumbs_have_one_entry_per_level() {
        let service = test_service();
        let mut parent = None;
        let mut ids = Vec::new();
        for depth in 0..5 {
            let folder = service
                .create_folder(USER, &format!("level {depth}"), parent)
                .unwrap();
            parent = Some(folder.id);
            ids.push(folder.id);
            let view = service.get_folder_view(USER, parent).unwrap();
            assert_eq!(depth + 2, view.breadcrumbs.len());
        }
        let view = service.get_folder_view(USER, parent).unwrap();
        assert_eq!(ROOT_NAME, view.breadcrumbs[0].name);
        assert_eq!(ROOT_HREF, view.breadcrumbs[0].href);
        let crumb_ids: Vec<Uuid> = view.breadcrumbs[1..]
            .iter()
            .map(|b| b.id.unwrap())
            .collect();
        assert_eq!(ids, crumb_ids);
        assert_eq!(
            format!("/dashboard/folder/{}", ids[4]),
            view.breadcrumbs[5].href
        );
        cleanup();
    }

    #[test]
    fn view_of_other_users_folder() {
        let service = test_service();
        let theirs = service.create_folder(OTHER_USER, "theirs", None).unwrap();
        let res = service.get_folder_view(USER, Some(theirs.id)).unwrap_err();
        assert_eq!(FolderError::NotFound, res);
        cleanup();
    }

    #[test]
    fn view_of_corrupt_tree() {
        let store = test_store();
        let a = store.insert("a", None, USER).unwrap();
        let b = store.insert("b", Some(a.id), USER).unwrap();
        force_parent(&store, a.id, Some(b.id));
        let service = crate::folders::service::FolderService::new(store);
        let res = service.get_folder_view(USER, Some(b.id)).unwrap_err();
        assert!(matches!(res, FolderError::CorruptTree(_)));
        cleanup();
    }

    /// create A, B under A, C under B, then move C to the Dashboard and delete A
    #[test]
    fn full_lifecycle() {
        let service = test_service();
        let a = service.create_folder(USER, "A", None).unwrap();
        let b = service.create_folder(USER, "B", Some(a.id)).unwrap();
        let c = service.create_folder(USER, "C", Some(b.id)).unwrap();

        let view = service.get_folder_view(USER, Some(c.id)).unwrap();
        let crumbs: Vec<&str> = view.breadcrumbs.iter().map(|b| b.name.as_str()).collect();
        assert_eq!(vec!["Dashboard", "A", "B", "C"], crumbs);

        assert_eq!(
            FolderError::IllegalMove,
            service.move_folder(USER, a.id, Some(c.id)).unwrap_err()
        );
        service.move_folder(USER, c.id, None).unwrap();
        let view = service.get_folder_view(USER, Some(c.id)).unwrap();
        assert_eq!(2, view.breadcrumbs.len());
        let all = service.get_all_folders(USER).unwrap();
        let moved = all.iter().find(|f| f.id == c.id).unwrap();
        assert_eq!(None, moved.parent_id);
        let view = service.get_folder_view(USER, Some(b.id)).unwrap();
        assert!(view.contents.folders.is_empty());
        assert_eq!(0, view.total_folders);

        service.delete_folder(USER, a.id).unwrap();
        let remaining: Vec<Uuid> = service
            .get_all_folders(USER)
            .unwrap()
            .into_iter()
            .map(|f| f.id)
            .collect();
        assert_eq!(vec![c.id], remaining);
        cleanup();
    }
}

mod nesting_depth_tests {
    use crate::folders::repository::MAX_TREE_DEPTH;
    use crate::folders::service::FolderService;
    use crate::model::error::folder_errors::FolderError;
    use crate::test::*;

    #[test]
    fn create_folder_past_max_depth() {
        let store = test_store();
        let chain = create_chain(&store, "l", MAX_TREE_DEPTH, None);
        let deepest = chain.last().unwrap().id;
        let service = FolderService::new(store);
        let res = service
            .create_folder(USER, "one too many", Some(deepest))
            .unwrap_err();
        assert!(matches!(res, FolderError::Validation(_)));
        // the deepest allowed folder still resolves
        let view = service.get_folder_view(USER, Some(deepest)).unwrap();
        assert_eq!(MAX_TREE_DEPTH + 1, view.breadcrumbs.len());
        cleanup();
    }

    #[test]
    fn move_folder_past_max_depth() {
        let store = test_store();
        let upper = create_chain(&store, "a", 600, None);
        let lower = create_chain(&store, "b", 401, None);
        let service = FolderService::new(store);
        // 600 + 401 levels
        let res = service
            .move_folder(USER, lower[0].id, Some(upper[599].id))
            .unwrap_err();
        assert!(matches!(res, FolderError::Validation(_)));
        let view = service.get_folder_view(USER, Some(lower[0].id)).unwrap();
        assert_eq!(None, view.folder.unwrap().parent_id);
        // 599 + 401 levels lands exactly on the limit
        service
            .move_folder(USER, lower[0].id, Some(upper[598].id))
            .unwrap();
        let view = service.get_folder_view(USER, Some(lower[400].id)).unwrap();
        assert_eq!(MAX_TREE_DEPTH + 1, view.breadcrumbs.len());
        cleanup();
    }
}

mod invariant_tests {
    use std::collections::{HashMap, HashSet};
    use std::thread;

    use rand::rngs::StdRng;
    use rand::seq::SliceRandom;
    use rand::{Rng, SeedableRng};
    use uuid::Uuid;

    use crate::folders::models::Folder;
    use crate::folders::service::FolderService;
    use crate::model::error::folder_errors::FolderError;
    use crate::test::*;

    /// every live folder hangs off a live parent of the same owner, the parent links never loop,
    /// and no two live siblings share a name
    fn assert_tree_is_sound(service: &FolderService, user_id: &str) {
        let folders = service.get_all_folders(user_id).unwrap();
        let by_id: HashMap<Uuid, &Folder> = folders.iter().map(|f| (f.id, f)).collect();
        let mut sibling_names = HashSet::new();
        for folder in &folders {
            assert_eq!(user_id, folder.user_id);
            assert!(
                sibling_names.insert((folder.parent_id, folder.name.clone())),
                "duplicate sibling name {}",
                folder.name
            );
            let mut seen = HashSet::from([folder.id]);
            let mut current = folder.parent_id;
            while let Some(parent_id) = current {
                let parent = by_id
                    .get(&parent_id)
                    .unwrap_or_else(|| panic!("{} has a dangling parent", folder.id));
                assert!(seen.insert(parent_id), "cycle through {}", folder.id);
                current = parent.parent_id;
            }
            let view = service.get_folder_view(user_id, Some(folder.id)).unwrap();
            assert_eq!(seen.len() + 1, view.breadcrumbs.len());
        }
    }

    #[test]
    fn random_operations_keep_tree_sound() {
        let service = test_service();
        let mut rng = StdRng::seed_from_u64(0x5eed);
        let names = ["a", "b", "c", "d"];
        for _ in 0..300 {
            let live: Vec<Uuid> = service
                .get_all_folders(USER)
                .unwrap()
                .into_iter()
                .map(|f| f.id)
                .collect();
            let pick = |rng: &mut StdRng| -> Option<Uuid> {
                if live.is_empty() || rng.gen_bool(0.2) {
                    None
                } else {
                    live.choose(rng).copied()
                }
            };
            let name = *names.choose(&mut rng).unwrap();
            let res = match rng.gen_range(0..4) {
                0 => {
                    let parent = pick(&mut rng);
                    service.create_folder(USER, name, parent).map(|_| ())
                }
                1 => match pick(&mut rng) {
                    Some(id) => service.rename_folder(USER, id, name).map(|_| ()),
                    None => Ok(()),
                },
                2 => match pick(&mut rng) {
                    Some(id) => {
                        let destination = pick(&mut rng);
                        service.move_folder(USER, id, destination).map(|_| ())
                    }
                    None => Ok(()),
                },
                _ => match pick(&mut rng) {
                    Some(id) if rng.gen_bool(0.3) => service.delete_folder(USER, id),
                    _ => Ok(()),
                },
            };
            if let Err(e) = res {
                assert!(
                    matches!(e, FolderError::DuplicateName | FolderError::IllegalMove),
                    "unexpected error {e:?}"
                );
            }
            assert_tree_is_sound(&service, USER);
        }
        cleanup();
    }

    #[test]
    fn opposing_moves_never_form_a_cycle() {
        let service = test_service();
        for round in 0..10 {
            let a = service
                .create_folder(USER, &format!("a{round}"), None)
                .unwrap();
            let b = service
                .create_folder(USER, &format!("b{round}"), None)
                .unwrap();
            let first = {
                let service = service.clone();
                thread::spawn(move || service.move_folder(USER, a.id, Some(b.id)))
            };
            let second = {
                let service = service.clone();
                thread::spawn(move || service.move_folder(USER, b.id, Some(a.id)))
            };
            let results = [first.join().unwrap(), second.join().unwrap()];
            let succeeded = results.iter().filter(|r| r.is_ok()).count();
            assert_eq!(1, succeeded, "exactly one move wins: {results:?}");
            for res in results.iter().filter_map(|r| r.as_ref().err()) {
                assert_eq!(&FolderError::IllegalMove, res);
            }
            assert_tree_is_sound(&service, USER);
        }
        cleanup();
    }
}
