use serde_json::json;

use crate::common::{TestApp, routes};

mod creation {
    use super::*;

    #[tokio::test]
    async fn projects_get_sequential_tables() {
        let app = TestApp::spawn().await;
        let first = app.create_project("Lens").await;
        let second = app
            .create_project_with(json!({
                "name": "Orbit",
                "description": "Satellite tracker",
                "challenge_list": ["Hardware", " "],
            }))
            .await;

        assert_eq!(app.project(first).await["location"], 1);
        let orbit = app.project(second).await;
        assert_eq!(orbit["location"], 2);
        assert_eq!(orbit["challenge_list"], json!(["Hardware"]));
        assert_eq!(orbit["active"], true);
        assert_eq!(orbit["seen"], 0);
    }

    #[tokio::test]
    async fn multi_group_fills_groups_in_order() {
        let app = TestApp::spawn().await;
        let res = app
            .post_as_admin(
                routes::ADMIN_OPTIONS,
                &json!({"multi_group": true, "num_groups": 2, "group_sizes": [1, 5]}),
            )
            .await;
        assert_eq!(res.status, 200, "{}", res.text);

        let a = app.project(app.create_project("Lens").await).await;
        let b = app.project(app.create_project("Orbit").await).await;
        let c = app.project(app.create_project("Pulse").await).await;
        assert_eq!((a["group"].clone(), a["location"].clone()), (json!(0), json!(1)));
        assert_eq!((b["group"].clone(), b["location"].clone()), (json!(1), json!(1)));
        assert_eq!((c["group"].clone(), c["location"].clone()), (json!(1), json!(2)));
    }

    #[tokio::test]
    async fn name_is_required() {
        let app = TestApp::spawn().await;
        let res = app
            .post_as_admin(routes::PROJECT_NEW, &json!({"name": ""}))
            .await;
        assert_eq!(res.status, 400);
        assert_eq!(res.body["code"], "VALIDATION_ERROR");
    }

    #[tokio::test]
    async fn malformed_body_is_a_validation_error() {
        let app = TestApp::spawn().await;
        let res = app
            .post_as_admin(routes::PROJECT_NEW, &json!({"description": "no name"}))
            .await;
        assert_eq!(res.status, 400);
    }
}

mod import {
    use super::*;

    #[tokio::test]
    async fn generic_csv_without_header() {
        let app = TestApp::spawn().await;
        let csv = "Lens,Camera app,https://lens.dev\nOrbit,Tracker,https://orbit.dev,,,\"AI, Hardware\"\n";

        let res = app.upload_csv_as_admin(routes::PROJECT_CSV, csv, false).await;
        assert_eq!(res.status, 200, "{}", res.text);
        assert_eq!(res.body["added"], 2);

        let list = app.get_as_admin(routes::PROJECT_LIST).await;
        let projects = list.body.as_array().unwrap();
        assert_eq!(projects.len(), 2);
        let orbit = projects.iter().find(|p| p["name"] == "Orbit").unwrap();
        assert_eq!(orbit["challenge_list"], json!(["AI", "Hardware"]));
    }

    #[tokio::test]
    async fn devpost_export_skips_drafts() {
        let app = TestApp::spawn().await;
        let csv = "\
Project Title,Submission Url,Project Status,Judging Status,Highest Step Completed,Project Created At,About The Project,Try It Out Links,Video Demo Link,Opt-In Prizes
Lens,https://devpost.com/software/lens,Submitted (Gallery/Visible),Pending,Submit,2024-02-10,Camera app,https://lens.dev,https://youtu.be/x,\"Best AI, Best Hardware\"
Ghost,https://devpost.com/software/ghost,Draft,Pending,Details,2024-02-10,,,,
";

        let res = app.upload_csv_as_admin(routes::PROJECT_DEVPOST, csv, true).await;
        assert_eq!(res.status, 200, "{}", res.text);
        assert_eq!(res.body["added"], 1);

        let list = app.get_as_admin(routes::PROJECT_LIST).await;
        let lens = &list.body[0];
        assert_eq!(lens["name"], "Lens");
        assert_eq!(lens["try_link"], "https://lens.dev");
        assert_eq!(lens["challenge_list"], json!(["Best AI", "Best Hardware"]));
    }

    #[tokio::test]
    async fn missing_csv_field_is_rejected() {
        let app = TestApp::spawn().await;
        let res = app.upload_csv_as_admin(routes::PROJECT_CSV, ",no name\n", false).await;
        assert_eq!(res.status, 400);
        assert_eq!(app.get_as_admin(routes::PROJECT_COUNT).await.body["count"], 0);
    }
}

mod lookup {
    use super::*;

    #[tokio::test]
    async fn unknown_project_fetch_is_400_and_delete_is_500() {
        let app = TestApp::spawn().await;

        let res = app.get_as_admin(&routes::project(4242)).await;
        assert_eq!(res.status, 400);
        assert_eq!(res.body["code"], "NOT_FOUND");

        let res = app.delete_as_admin(&routes::project(4242)).await;
        assert_eq!(res.status, 500);
    }

    #[tokio::test]
    async fn count_and_stats() {
        let app = TestApp::spawn().await;
        let lens = app.create_project("Lens").await;
        app.create_project("Orbit").await;
        app.put_as_admin(&routes::project_hide(lens)).await;

        let res = app.get_as_admin(routes::PROJECT_COUNT).await;
        assert_eq!(res.body["count"], 2);

        let res = app.get_as_admin(routes::PROJECT_STATS).await;
        assert_eq!(res.body["num"], 2);
        assert_eq!(res.body["num_active"], 1);
    }

    #[tokio::test]
    async fn public_list_needs_no_auth_and_hides_inactive() {
        let app = TestApp::spawn().await;
        let lens = app.create_project("Lens").await;
        app.create_project("Orbit").await;
        app.put_as_admin(&routes::project_hide(lens)).await;

        let res = app.get_without_token(routes::PROJECT_PUBLIC).await;
        assert_eq!(res.status, 200);
        let names: Vec<&str> = res
            .body
            .as_array()
            .unwrap()
            .iter()
            .map(|p| p["name"].as_str().unwrap())
            .collect();
        assert_eq!(names, vec!["Orbit"]);
        assert!(res.body[0].get("seen").is_none());
    }

    #[tokio::test]
    async fn admin_routes_reject_missing_credentials() {
        let app = TestApp::spawn().await;
        let res = app.get_without_token(routes::PROJECT_LIST).await;
        assert_eq!(res.status, 401);
        assert_eq!(res.body["code"], "TOKEN_MISSING");
    }
}

mod visibility {
    use super::*;

    #[tokio::test]
    async fn hiding_releases_current_judge() {
        let app = TestApp::spawn().await;
        let lens = app.create_project("Lens").await;
        let judge = app.create_judge("Ada").await;
        assert_eq!(app.next_project(&judge.token).await, Some(lens));

        let res = app.put_as_admin(&routes::project_hide(lens)).await;
        assert_eq!(res.status, 200);
        let project = app.project(lens).await;
        assert_eq!(project["active"], false);
        assert_eq!(project["seen"], 0);

        let me = app.get_with_token(routes::JUDGE, &judge.token).await;
        assert!(me.body["current"].is_null());
        assert_eq!(app.next_project(&judge.token).await, None);

        app.put_as_admin(&routes::project_unhide(lens)).await;
        assert_eq!(app.next_project(&judge.token).await, Some(lens));
    }

    #[tokio::test]
    async fn prioritized_project_is_assigned_first() {
        let app = TestApp::spawn().await;
        app.create_project("Lens").await;
        let orbit = app.create_project("Orbit").await;
        app.create_project("Pulse").await;
        let res = app.put_as_admin(&routes::project_prioritize(orbit)).await;
        assert_eq!(res.status, 200);

        let judge = app.create_judge("Ada").await;
        assert_eq!(app.next_project(&judge.token).await, Some(orbit));
    }

    #[tokio::test]
    async fn deleting_assigned_project_frees_the_judge() {
        let app = TestApp::spawn().await;
        let lens = app.create_project("Lens").await;
        let judge = app.create_judge("Ada").await;
        app.next_project(&judge.token).await;

        let res = app.delete_as_admin(&routes::project(lens)).await;
        assert_eq!(res.status, 200);

        let me = app.get_with_token(routes::JUDGE, &judge.token).await;
        assert!(me.body["current"].is_null());
        assert_eq!(app.next_project(&judge.token).await, None);
    }

    #[tokio::test]
    async fn delete_racing_an_assignment_leaves_no_dangling_project() {
        let app = TestApp::spawn().await;
        for round in 0..10 {
            let lens = app.create_project(&format!("Lens {round}")).await;
            let judge = app.create_judge(&format!("Judge {round}")).await;

            let body = json!({});
            let path = routes::project(lens);
            let (next, deleted) = tokio::join!(
                app.post_with_token(routes::JUDGE_NEXT, &body, &judge.token),
                app.delete_as_admin(&path),
            );
            assert_eq!(next.status, 200, "next failed: {}", next.text);
            assert_eq!(deleted.status, 200, "delete failed: {}", deleted.text);

            let me = app.get_with_token(routes::JUDGE, &judge.token).await;
            assert!(me.body["current"].is_null(), "round {round}: {}", me.text);
            assert_eq!(app.next_project(&judge.token).await, None);
        }
    }

    #[tokio::test]
    async fn hide_racing_an_assignment_leaves_no_hidden_current() {
        let app = TestApp::spawn().await;
        for round in 0..10 {
            let lens = app.create_project(&format!("Lens {round}")).await;
            let judge = app.create_judge(&format!("Judge {round}")).await;

            let body = json!({});
            let path = routes::project_hide(lens);
            let (next, hidden) = tokio::join!(
                app.post_with_token(routes::JUDGE_NEXT, &body, &judge.token),
                app.put_as_admin(&path),
            );
            assert_eq!(next.status, 200, "next failed: {}", next.text);
            assert_eq!(hidden.status, 200, "hide failed: {}", hidden.text);

            let me = app.get_with_token(routes::JUDGE, &judge.token).await;
            assert!(me.body["current"].is_null(), "round {round}: {}", me.text);
            let project = app.project(lens).await;
            assert_eq!(project["active"], false);
            assert_eq!(project["seen"], 0);
        }
    }
}
