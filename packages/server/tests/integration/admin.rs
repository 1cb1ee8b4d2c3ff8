use serde_json::json;

use crate::common::{ADMIN_PASSWORD, TestApp, routes};

mod auth {
    use super::*;

    #[tokio::test]
    async fn login_checks_password() {
        let app = TestApp::spawn().await;

        let res = app
            .post_without_token(routes::ADMIN_LOGIN, &json!({"password": ADMIN_PASSWORD}))
            .await;
        assert_eq!(res.status, 200);
        assert_eq!(res.body["ok"], 1);

        let res = app
            .post_without_token(routes::ADMIN_LOGIN, &json!({"password": "nope"}))
            .await;
        assert_eq!(res.status, 401);
    }

    #[tokio::test]
    async fn basic_credentials_are_checked() {
        let app = TestApp::spawn().await;

        let res = app.post_as_admin(routes::ADMIN_AUTH, &json!({})).await;
        assert_eq!(res.status, 200);

        let res = app.get_with_basic(routes::ADMIN_STATS, "admin", "wrong").await;
        assert_eq!(res.status, 401);
        assert_eq!(res.body["code"], "INVALID_CREDENTIALS");

        let res = app.get_with_basic(routes::ADMIN_STATS, "root", ADMIN_PASSWORD).await;
        assert_eq!(res.status, 401);
    }

    #[tokio::test]
    async fn judge_token_is_not_admin() {
        let app = TestApp::spawn().await;
        let judge = app.create_judge("Ada").await;

        let res = app.get_with_token(routes::ADMIN_STATS, &judge.token).await;
        assert_eq!(res.status, 401);
    }
}

mod clock {
    use super::*;

    #[tokio::test]
    async fn pause_resume_reset() {
        let app = TestApp::spawn().await;

        let res = app.get_as_admin(routes::ADMIN_CLOCK).await;
        assert_eq!(res.body["running"], false);
        assert_eq!(res.body["time"], 0);

        let res = app.post_as_admin(routes::ADMIN_CLOCK_UNPAUSE, &json!({})).await;
        assert_eq!(res.status, 200);
        assert_eq!(res.body["running"], true);

        tokio::time::sleep(std::time::Duration::from_millis(20)).await;
        let res = app.post_as_admin(routes::ADMIN_CLOCK_PAUSE, &json!({})).await;
        assert_eq!(res.body["running"], false);
        let paused_at = res.body["time"].as_i64().unwrap();
        assert!(paused_at >= 20);

        let res = app.get_as_admin(routes::ADMIN_CLOCK).await;
        assert_eq!(res.body["time"].as_i64().unwrap(), paused_at);

        let res = app.post_as_admin(routes::ADMIN_CLOCK_RESET, &json!({})).await;
        assert_eq!(res.body["running"], false);
        assert_eq!(res.body["time"], 0);
    }

    #[tokio::test]
    async fn clock_state_is_persisted_in_options() {
        let app = TestApp::spawn().await;
        app.post_as_admin(routes::ADMIN_CLOCK_UNPAUSE, &json!({})).await;

        let res = app.get_as_admin(routes::ADMIN_OPTIONS).await;
        assert_eq!(res.body["clock"]["running"], true);
    }
}

mod options {
    use super::*;

    #[tokio::test]
    async fn partial_update_keeps_other_fields() {
        let app = TestApp::spawn().await;
        let before = app.get_as_admin(routes::ADMIN_OPTIONS).await.body;

        let res = app
            .post_as_admin(routes::ADMIN_OPTIONS, &json!({"min_views": 5, "tracks": ["AI"]}))
            .await;
        assert_eq!(res.status, 200, "{}", res.text);
        assert_eq!(res.body["min_views"], 5);
        assert_eq!(res.body["tracks"], json!(["AI"]));
        assert_eq!(res.body["categories"], before["categories"]);

        let after = app.get_as_admin(routes::ADMIN_OPTIONS).await.body;
        assert_eq!(after["min_views"], 5);
    }

    #[tokio::test]
    async fn invalid_values_are_rejected() {
        let app = TestApp::spawn().await;
        let res = app
            .post_as_admin(routes::ADMIN_OPTIONS, &json!({"num_groups": 0}))
            .await;
        assert_eq!(res.status, 400);
    }
}

mod results {
    use super::*;

    #[tokio::test]
    async fn scores_rankings_and_matrix_follow_completions() {
        let app = TestApp::spawn().await;
        app.create_project("Lens").await;
        app.create_project("Orbit").await;
        let judge = app.create_judge("Ada").await;

        let mut seen = Vec::new();
        for starred in [true, false] {
            seen.push(app.next_project(&judge.token).await.unwrap());
            app.finish(&judge.token, starred).await;
        }
        let res = app
            .post_with_token(routes::JUDGE_RANK, &json!({"ranking": [seen[0], seen[1]]}), &judge.token)
            .await;
        assert_eq!(res.status, 200);

        let scores = app.get_as_admin(routes::ADMIN_SCORE).await;
        assert_eq!(scores.status, 200);
        let scores = scores.body.as_array().unwrap();
        assert_eq!(scores[0]["project_id"], seen[0]);
        assert_eq!(scores[0]["stars"], 1);
        assert_eq!(scores[1]["stars"], 0);

        let orderings = app.get_as_admin(routes::ADMIN_RANKINGS).await;
        assert_eq!(orderings.body["borda"][0]["project_id"], seen[0]);
        assert_eq!(orderings.body["copeland"][0]["project_id"], seen[0]);

        let matrix = app.get_as_admin(routes::ADMIN_MATRIX).await.body;
        let ids: Vec<i64> = matrix["project_ids"]
            .as_array()
            .unwrap()
            .iter()
            .map(|v| v.as_i64().unwrap())
            .collect();
        let i = ids.iter().position(|&id| id == seen[0] as i64).unwrap();
        let j = ids.iter().position(|&id| id == seen[1] as i64).unwrap();
        assert_eq!(matrix["counts"][i][j], 1);
        assert_eq!(matrix["counts"][j][i], 1);
    }

    #[tokio::test]
    async fn rankings_leave_out_deleted_projects() {
        let app = TestApp::spawn().await;
        app.create_project("Lens").await;
        app.create_project("Orbit").await;
        let judge = app.create_judge("Ada").await;

        let mut seen = Vec::new();
        for _ in 0..2 {
            seen.push(app.next_project(&judge.token).await.unwrap());
            app.finish(&judge.token, false).await;
        }
        app.post_with_token(routes::JUDGE_RANK, &json!({"ranking": [seen[1], seen[0]]}), &judge.token)
            .await;

        let res = app.delete_as_admin(&routes::project(seen[1])).await;
        assert_eq!(res.status, 200);

        let orderings = app.get_as_admin(routes::ADMIN_RANKINGS).await.body;
        for method in ["borda", "copeland"] {
            let ids: Vec<i64> = orderings[method]
                .as_array()
                .unwrap()
                .iter()
                .map(|r| r["project_id"].as_i64().unwrap())
                .collect();
            assert_eq!(ids, vec![seen[0] as i64], "{method}");
        }
    }

    #[tokio::test]
    async fn global_stats() {
        let app = TestApp::spawn().await;
        app.create_project("Lens").await;
        let judge = app.create_judge("Ada").await;
        app.next_project(&judge.token).await;
        app.finish(&judge.token, false).await;

        let res = app.get_as_admin(routes::ADMIN_STATS).await;
        assert_eq!(res.status, 200);
        assert_eq!(res.body["projects"], 1);
        assert_eq!(res.body["judges"], 1);
        assert_eq!(res.body["votes"], 1);
    }
}

mod event_log {
    use super::*;

    #[tokio::test]
    async fn admin_and_judge_actions_are_logged() {
        let app = TestApp::spawn().await;
        app.create_project("Lens").await;
        let judge = app.create_judge("Ada").await;
        app.next_project(&judge.token).await;

        let res = app.get_as_admin(routes::ADMIN_LOG).await;
        assert_eq!(res.status, 200);
        let entries: Vec<&str> = res.body["entries"]
            .as_array()
            .unwrap()
            .iter()
            .map(|e| e.as_str().unwrap())
            .collect();
        assert!(entries.iter().any(|e| e.contains("ADMIN | Added project Lens")));
        assert!(entries.iter().any(|e| e.contains(&format!("JUDGE | Ada ({})", judge.id))));
    }
}

mod reset {
    use super::*;

    #[tokio::test]
    async fn reset_wipes_event_data() {
        let app = TestApp::spawn().await;
        app.create_project("Lens").await;
        let judge = app.create_judge("Ada").await;
        app.next_project(&judge.token).await;
        app.post_as_admin(routes::ADMIN_OPTIONS, &json!({"min_views": 9})).await;
        app.post_as_admin(routes::ADMIN_CLOCK_UNPAUSE, &json!({})).await;

        let res = app.post_as_admin(routes::ADMIN_RESET, &json!({})).await;
        assert_eq!(res.status, 200);

        assert_eq!(app.get_as_admin(routes::PROJECT_COUNT).await.body["count"], 0);
        assert!(app.get_as_admin(routes::JUDGE_LIST).await.body.as_array().unwrap().is_empty());
        assert_eq!(app.get_as_admin(routes::ADMIN_OPTIONS).await.body["min_views"], 3);
        assert_eq!(app.get_as_admin(routes::ADMIN_CLOCK).await.body["running"], false);
        assert!(app.get_as_admin(routes::ADMIN_MATRIX).await.body["project_ids"].as_array().unwrap().is_empty());

        let res = app.get_with_token(routes::JUDGE, &judge.token).await;
        assert_eq!(res.status, 401);

        // Table numbers restart after a reset.
        let lens = app.create_project("Lens").await;
        assert_eq!(app.project(lens).await["location"], 1);
    }
}
