use sea_orm::{ConnectionTrait, DbBackend, Statement};
use serde_json::json;

use crate::common::{TestApp, routes};

mod login {
    use super::*;

    #[tokio::test]
    async fn valid_code_returns_token() {
        let app = TestApp::spawn().await;
        let judge = app.create_judge("Ada").await;

        let res = app
            .post_with_token(routes::JUDGE_AUTH, &json!({}), &judge.token)
            .await;
        assert_eq!(res.status, 200);
        assert_eq!(res.body["ok"], 1);
    }

    #[tokio::test]
    async fn unknown_code_is_rejected() {
        let app = TestApp::spawn().await;
        app.create_judge("Ada").await;

        let res = app
            .post_without_token(routes::JUDGE_LOGIN, &json!({"code": "not-a-code"}))
            .await;
        assert_eq!(res.status, 401);
        assert_eq!(res.body["code"], "INVALID_CREDENTIALS");
    }

    #[tokio::test]
    async fn judge_routes_require_bearer_token() {
        let app = TestApp::spawn().await;

        let res = app.get_without_token(routes::JUDGE).await;
        assert_eq!(res.status, 401);
        assert_eq!(res.body["code"], "TOKEN_MISSING");

        let res = app.get_with_token(routes::JUDGE, "garbage").await;
        assert_eq!(res.status, 401);
        assert_eq!(res.body["code"], "TOKEN_INVALID");
    }

    #[tokio::test]
    async fn own_record_hides_token() {
        let app = TestApp::spawn().await;
        let judge = app.create_judge("Ada").await;

        let res = app.get_with_token(routes::JUDGE, &judge.token).await;
        assert_eq!(res.status, 200);
        assert_eq!(res.body["id"], judge.id);
        assert_eq!(res.body["name"], "Ada");
        assert!(res.body.get("token").is_none());
    }

    #[tokio::test]
    async fn welcome_flag_is_set_once() {
        let app = TestApp::spawn().await;
        let judge = app.create_judge("Ada").await;

        let res = app.get_with_token(routes::JUDGE_WELCOME, &judge.token).await;
        assert_eq!(res.body["read_welcome"], false);

        for _ in 0..2 {
            let res = app
                .post_with_token(routes::JUDGE_WELCOME, &json!({}), &judge.token)
                .await;
            assert_eq!(res.status, 200);
        }

        let res = app.get_with_token(routes::JUDGE_WELCOME, &judge.token).await;
        assert_eq!(res.body["read_welcome"], true);
    }
}

mod assignment {
    use super::*;

    #[tokio::test]
    async fn next_assigns_and_is_stable() {
        let app = TestApp::spawn().await;
        let project = app.create_project("Lens").await;
        let judge = app.create_judge("Ada").await;

        assert_eq!(app.next_project(&judge.token).await, Some(project));
        assert_eq!(app.next_project(&judge.token).await, Some(project));
        assert_eq!(app.project(project).await["seen"], 1);
    }

    #[tokio::test]
    async fn next_reports_exhaustion() {
        let app = TestApp::spawn().await;
        let judge = app.create_judge("Ada").await;

        let res = app
            .post_with_token(routes::JUDGE_NEXT, &json!({}), &judge.token)
            .await;
        assert_eq!(res.status, 200);
        assert_eq!(res.body["no_more"], true);
        assert!(res.body["project"].is_null());
    }

    #[tokio::test]
    async fn concurrent_judges_are_spread_over_free_tables() {
        let app = TestApp::spawn().await;
        app.create_project("Lens").await;
        app.create_project("Orbit").await;
        let a = app.create_judge("Ada").await;
        let b = app.create_judge("Grace").await;

        let (pa, pb) = tokio::join!(app.next_project(&a.token), app.next_project(&b.token));
        assert_ne!(pa.unwrap(), pb.unwrap());
    }

    #[tokio::test]
    async fn concurrent_next_calls_from_one_judge_agree() {
        let app = TestApp::spawn().await;
        for name in ["Lens", "Orbit", "Pulse"] {
            app.create_project(name).await;
        }
        let judge = app.create_judge("Ada").await;

        let (first, second) =
            tokio::join!(app.next_project(&judge.token), app.next_project(&judge.token));
        let project = first.unwrap();
        assert_eq!(second, Some(project));
        assert_eq!(app.project(project).await["seen"], 1);

        let total: i64 = app
            .get_as_admin(routes::PROJECT_LIST)
            .await
            .body
            .as_array()
            .unwrap()
            .iter()
            .map(|p| p["seen"].as_i64().unwrap())
            .sum();
        assert_eq!(total, 1);
    }

    #[tokio::test]
    async fn dangling_current_is_cleared_by_hiding_the_judge() {
        let app = TestApp::spawn().await;
        let lens = app.create_project("Lens").await;
        let judge = app.create_judge("Ada").await;
        app.db
            .execute_raw(Statement::from_string(
                DbBackend::Postgres,
                format!("UPDATE judge SET current = 999999 WHERE id = {}", judge.id),
            ))
            .await
            .expect("Failed to point judge at a missing project");

        let res = app
            .post_with_token(routes::JUDGE_NEXT, &json!({}), &judge.token)
            .await;
        assert_eq!(res.status, 500);
        assert_eq!(res.body["code"], "INVARIANT_VIOLATION");

        assert_eq!(app.put_as_admin(&routes::judge_hide(judge.id)).await.status, 200);
        assert_eq!(app.put_as_admin(&routes::judge_unhide(judge.id)).await.status, 200);
        let me = app.get_with_token(routes::JUDGE, &judge.token).await;
        assert!(me.body["current"].is_null());
        assert_eq!(app.next_project(&judge.token).await, Some(lens));
    }

    #[tokio::test]
    async fn finished_projects_are_not_offered_again() {
        let app = TestApp::spawn().await;
        let project = app.create_project("Lens").await;
        let judge = app.create_judge("Ada").await;

        assert_eq!(app.next_project(&judge.token).await, Some(project));
        app.finish(&judge.token, true).await;
        assert_eq!(app.next_project(&judge.token).await, None);

        let res = app.get_with_token(routes::JUDGE_PROJECTS, &judge.token).await;
        assert_eq!(res.status, 200);
        let seen = res.body.as_array().unwrap();
        assert_eq!(seen.len(), 1);
        assert_eq!(seen[0]["project_id"], project);
        assert_eq!(seen[0]["starred"], true);
    }

    #[tokio::test]
    async fn hidden_judge_gets_no_assignment() {
        let app = TestApp::spawn().await;
        app.create_project("Lens").await;
        let judge = app.create_judge("Ada").await;

        let res = app.put_as_admin(&routes::judge_hide(judge.id)).await;
        assert_eq!(res.status, 200);

        let res = app
            .post_with_token(routes::JUDGE_NEXT, &json!({}), &judge.token)
            .await;
        assert_eq!(res.status, 400);
    }

    #[tokio::test]
    async fn hiding_judge_releases_their_project() {
        let app = TestApp::spawn().await;
        let project = app.create_project("Lens").await;
        let judge = app.create_judge("Ada").await;
        app.next_project(&judge.token).await;

        app.put_as_admin(&routes::judge_hide(judge.id)).await;
        assert_eq!(app.project(project).await["seen"], 0);

        app.put_as_admin(&routes::judge_unhide(judge.id)).await;
        assert_eq!(app.next_project(&judge.token).await, Some(project));
    }
}

mod skipping {
    use super::*;

    #[tokio::test]
    async fn skip_without_current_project_fails() {
        let app = TestApp::spawn().await;
        let judge = app.create_judge("Ada").await;

        let res = app
            .post_with_token(
                routes::JUDGE_SKIP,
                &json!({"reason": "absent", "get_new": true}),
                &judge.token,
            )
            .await;
        assert_eq!(res.status, 400);
        assert_eq!(res.body["code"], "VALIDATION_ERROR");
    }

    #[tokio::test]
    async fn absent_skip_flags_and_replaces() {
        let app = TestApp::spawn().await;
        let first = app.create_project("Lens").await;
        let second = app.create_project("Orbit").await;
        let judge = app.create_judge("Ada").await;

        let current = app.next_project(&judge.token).await.unwrap();
        let other = if current == first { second } else { first };

        let res = app
            .post_with_token(
                routes::JUDGE_SKIP,
                &json!({"reason": "absent", "get_new": true}),
                &judge.token,
            )
            .await;
        assert_eq!(res.status, 200, "{}", res.text);
        assert_eq!(res.body["project"]["id"], other);
        assert_eq!(app.project(current).await["seen"], 0);

        let flags = app.get_as_admin(routes::ADMIN_FLAGS).await;
        let flags = flags.body.as_array().unwrap();
        assert_eq!(flags.len(), 1);
        assert_eq!(flags[0]["project_id"], current);
        assert_eq!(flags[0]["judge_name"], "Ada");
        assert_eq!(flags[0]["reason"], "absent");
    }

    #[tokio::test]
    async fn flagged_project_is_never_offered_again() {
        let app = TestApp::spawn().await;
        let project = app.create_project("Lens").await;
        let judge = app.create_judge("Ada").await;
        app.next_project(&judge.token).await;

        let res = app
            .post_with_token(
                routes::JUDGE_SKIP,
                &json!({"reason": "cannot-demo", "get_new": true}),
                &judge.token,
            )
            .await;
        assert_eq!(res.status, 200);
        assert_eq!(res.body["no_more"], true);
        assert_eq!(app.next_project(&judge.token).await, None);
        assert_eq!(app.project(project).await["seen"], 0);
    }

    #[tokio::test]
    async fn break_skip_is_not_flagged_and_project_returns() {
        let app = TestApp::spawn().await;
        let project = app.create_project("Lens").await;
        let judge = app.create_judge("Ada").await;
        app.next_project(&judge.token).await;

        let res = app
            .post_with_token(
                routes::JUDGE_SKIP,
                &json!({"reason": "break"}),
                &judge.token,
            )
            .await;
        assert_eq!(res.status, 200);
        assert_eq!(res.body["no_more"], false);

        let flags = app.get_as_admin(routes::ADMIN_FLAGS).await;
        assert!(flags.body.as_array().unwrap().is_empty());
        // The only candidate left is the one skipped for the break.
        assert_eq!(app.next_project(&judge.token).await, Some(project));
    }
}

mod ranking {
    use super::*;

    async fn judge_two(app: &TestApp) -> (String, Vec<i32>) {
        app.create_project("Lens").await;
        app.create_project("Orbit").await;
        let judge = app.create_judge("Ada").await;
        let mut seen = Vec::new();
        for _ in 0..2 {
            seen.push(app.next_project(&judge.token).await.unwrap());
            app.finish(&judge.token, false).await;
        }
        (judge.token, seen)
    }

    #[tokio::test]
    async fn rank_stores_order_and_scores() {
        let app = TestApp::spawn().await;
        let (token, seen) = judge_two(&app).await;

        let res = app
            .post_with_token(routes::JUDGE_RANK, &json!({"ranking": [seen[1], seen[0]]}), &token)
            .await;
        assert_eq!(res.status, 200, "{}", res.text);

        let me = app.get_with_token(routes::JUDGE, &token).await;
        assert_eq!(me.body["rankings"], json!([seen[1], seen[0]]));
        let agg = &me.body["rankings_agg"];
        assert!(agg[seen[1].to_string()].as_i64() > agg[seen[0].to_string()].as_i64());
    }

    #[tokio::test]
    async fn rank_rejects_unseen_and_duplicate_ids() {
        let app = TestApp::spawn().await;
        let (token, seen) = judge_two(&app).await;

        let res = app
            .post_with_token(routes::JUDGE_RANK, &json!({"ranking": [seen[0], seen[0]]}), &token)
            .await;
        assert_eq!(res.status, 400);

        let res = app
            .post_with_token(routes::JUDGE_RANK, &json!({"ranking": [9999]}), &token)
            .await;
        assert_eq!(res.status, 400);
    }

    #[tokio::test]
    async fn star_and_notes_can_be_edited() {
        let app = TestApp::spawn().await;
        let (token, seen) = judge_two(&app).await;

        let res = app
            .put_with_token(&routes::judge_star(seen[0]), &json!({"starred": true}), &token)
            .await;
        assert_eq!(res.status, 200);
        let res = app
            .put_with_token(&routes::judge_notes(seen[0]), &json!({"notes": "great demo"}), &token)
            .await;
        assert_eq!(res.status, 200);

        let res = app.get_with_token(routes::JUDGE_PROJECTS, &token).await;
        let entry = res
            .body
            .as_array()
            .unwrap()
            .iter()
            .find(|p| p["project_id"] == seen[0])
            .unwrap()
            .clone();
        assert_eq!(entry["starred"], true);
        assert_eq!(entry["notes"], "great demo");

        let res = app
            .put_with_token(&routes::judge_star(9999), &json!({"starred": true}), &token)
            .await;
        assert_eq!(res.status, 400);
    }
}

mod management {
    use super::*;

    #[tokio::test]
    async fn csv_import_adds_judges_with_codes() {
        let app = TestApp::spawn().await;
        let csv = "name,email,notes\nAda,ada@example.com,\nGrace,grace@example.com,navy\n";

        let res = app.upload_csv_as_admin(routes::JUDGE_CSV, csv, true).await;
        assert_eq!(res.status, 200, "{}", res.text);
        assert_eq!(res.body["added"], 2);

        let list = app.get_as_admin(routes::JUDGE_LIST).await;
        let judges = list.body.as_array().unwrap();
        assert_eq!(judges.len(), 2);
        for j in judges {
            let code = j["code"].as_str().unwrap();
            assert_eq!(code.len(), 6);
            assert!(code.chars().all(|c| c.is_ascii_digit()));
        }
    }

    #[tokio::test]
    async fn new_judge_requires_name() {
        let app = TestApp::spawn().await;
        let res = app.post_as_admin(routes::JUDGE_NEW, &json!({"name": "  "})).await;
        assert_eq!(res.status, 400);
    }

    #[tokio::test]
    async fn deleting_judge_revokes_token_and_releases_project() {
        let app = TestApp::spawn().await;
        let project = app.create_project("Lens").await;
        let judge = app.create_judge("Ada").await;
        app.next_project(&judge.token).await;

        let res = app.delete_as_admin(&routes::judge(judge.id)).await;
        assert_eq!(res.status, 200);
        assert_eq!(app.project(project).await["seen"], 0);

        let res = app.get_with_token(routes::JUDGE, &judge.token).await;
        assert_eq!(res.status, 401);

        let res = app.delete_as_admin(&routes::judge(judge.id)).await;
        assert_eq!(res.status, 500);
    }

    #[tokio::test]
    async fn stats_count_completions() {
        let app = TestApp::spawn().await;
        app.create_project("Lens").await;
        let judge = app.create_judge("Ada").await;
        app.create_judge("Grace").await;
        app.next_project(&judge.token).await;
        app.finish(&judge.token, false).await;

        let res = app.get_as_admin(routes::JUDGE_STATS).await;
        assert_eq!(res.status, 200);
        assert_eq!(res.body["num"], 2);
        assert_eq!(res.body["num_active"], 2);
        assert_eq!(res.body["avg_seen"], 0.5);
    }
}
