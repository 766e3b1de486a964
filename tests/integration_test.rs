use mockito::{Matcher, Server, ServerGuard};
use qfnu_evaluate::config::{Config, Credentials};
use qfnu_evaluate::error::{AppError, AuthError, MarkupError};
use qfnu_evaluate::models::ScoringStrategy;
use qfnu_evaluate::services::auth::{AuthManager, AuthState};
use qfnu_evaluate::services::captcha::{CaptchaResolver, CaptchaSolver};
use qfnu_evaluate::services::{BatchDiscovery, EvaluationService, ListHarvester};
use qfnu_evaluate::workflow::{EvaluationCtx, EvaluationFlow, FlowResult};
use qfnu_evaluate::PortalSession;
use std::collections::VecDeque;
use std::sync::Mutex;
use std::time::Duration;

const LIST_PATTERN: &str = r"^/jsxsd/xspj/xspj_list\.do";
const EDIT_PATTERN: &str = r"^/jsxsd/xspj/xspj_edit\.do";
const BATCH_PATH: &str = "?pj0502id=B1&pj01id=&xnxq01id=2024-2025-2";

/// 按顺序给出预设答案的验证码求解器
struct ScriptedSolver {
    answers: Mutex<VecDeque<&'static str>>,
}

impl ScriptedSolver {
    fn new(answers: &[&'static str]) -> Self {
        Self {
            answers: Mutex::new(answers.iter().copied().collect()),
        }
    }
}

impl CaptchaSolver for ScriptedSolver {
    async fn solve(&self, _image: &[u8]) -> Option<String> {
        self.answers.lock().unwrap().pop_front().map(str::to_string)
    }
}

fn session(server: &ServerGuard) -> PortalSession {
    PortalSession::new(server.url(), Duration::from_secs(5)).unwrap()
}

fn auth(server: &ServerGuard, answers: &[&'static str]) -> AuthManager<ScriptedSolver> {
    let credentials = Credentials::new("S12345", "hunter2").unwrap();
    AuthManager::new(session(server), credentials, ScriptedSolver::new(answers))
        .with_retry_delay(Duration::ZERO)
}

/// 待评价列表页：`rows` 为 (课程, 教师, 链接)
fn list_page(rows: &[(&str, &str, &str)], footer: &str) -> String {
    let body: String = rows
        .iter()
        .enumerate()
        .map(|(i, (course, teacher, href))| {
            format!(
                r#"<tr><td>{}</td><td>{course}</td><td>{teacher}</td><td><a href="{href}">评价</a></td></tr>"#,
                i + 1
            )
        })
        .collect();
    format!(
        r#"<html><body>
<form id="Form1" method="post">
<input type="hidden" name="pj0502id" value="B1"/>
<input type="hidden" name="pj05id" value="R1"/>
<input type="hidden" name="pj02id" value="T1"/>
<input type="hidden" name="pj01id" value="P1"/>
<input type="hidden" name="pj03id" value="F1"/>
<input type="hidden" name="pageIndex" value="1"/>
<table id="dataList">
<tr><th>序号</th><th>课程名称</th><th>授课教师</th><th>操作</th></tr>
{body}
</table>
<div>{footer}</div>
</form></body></html>"#
    )
}

fn page_rows(page: usize, per_page: usize) -> Vec<(String, String, String)> {
    (1..=per_page)
        .map(|r| {
            (
                format!("课程{}-{}", page, r),
                format!("教师{}-{}", page, r),
                format!("/jsxsd/xspj/xspj_edit.do?id={}_{}", page, r),
            )
        })
        .collect()
}

fn render_page(page: usize, per_page: usize, footer: &str) -> String {
    let rows = page_rows(page, per_page);
    let borrowed: Vec<(&str, &str, &str)> = rows
        .iter()
        .map(|(c, t, h)| (c.as_str(), t.as_str(), h.as_str()))
        .collect();
    list_page(&borrowed, footer)
}

fn page_index(index: usize) -> Matcher {
    Matcher::UrlEncoded("pageIndex".into(), index.to_string())
}

// ========== 登录 ==========

#[tokio::test]
async fn test_login_retries_after_wrong_captcha() {
    let mut server = Server::new_async().await;
    let _root = server
        .mock("GET", "/jsxsd/")
        .with_status(200)
        .with_body("<html>登录</html>")
        .create_async()
        .await;
    let captcha = server
        .mock("GET", "/jsxsd/verifycode.servlet")
        .with_status(200)
        .with_body(vec![0xFF, 0xD8, 0xFF])
        .expect(2)
        .create_async()
        .await;
    let wrong = server
        .mock("POST", "/jsxsd/xk/LoginToXkLdap")
        .match_body(Matcher::AllOf(vec![
            Matcher::UrlEncoded("RANDOMCODE".into(), "aaaa".into()),
            Matcher::UrlEncoded("encoded".into(), "UzEyMzQ1%%%aHVudGVyMg==".into()),
        ]))
        .with_status(200)
        .with_body("<font color='red'>验证码错误!!</font>")
        .expect(1)
        .create_async()
        .await;
    let accepted = server
        .mock("POST", "/jsxsd/xk/LoginToXkLdap")
        .match_body(Matcher::UrlEncoded("RANDOMCODE".into(), "bbbb".into()))
        .with_status(200)
        .with_body("<html>跳转中</html>")
        .expect(1)
        .create_async()
        .await;
    let _home = server
        .mock("GET", "/jsxsd/framework/xsMain.jsp")
        .with_status(200)
        .with_body("<html>学生个人中心</html>")
        .create_async()
        .await;

    let mut manager = auth(&server, &["aaaa", "bbbb"]);
    assert_eq!(manager.state(), AuthState::Anonymous);
    manager.establish_session().await.unwrap();
    assert_eq!(manager.state(), AuthState::CookieAcquired);

    manager.attempt_login(3).await.unwrap();
    assert_eq!(manager.state(), AuthState::Authenticated);

    captcha.assert_async().await;
    wrong.assert_async().await;
    accepted.assert_async().await;
}

#[tokio::test]
async fn test_wrong_password_stops_immediately() {
    let mut server = Server::new_async().await;
    let _root = server
        .mock("GET", "/jsxsd/")
        .with_status(200)
        .create_async()
        .await;
    let captcha = server
        .mock("GET", "/jsxsd/verifycode.servlet")
        .with_status(200)
        .with_body(vec![1, 2, 3])
        .expect(1)
        .create_async()
        .await;
    let _login = server
        .mock("POST", "/jsxsd/xk/LoginToXkLdap")
        .with_status(200)
        .with_body("<font>该帐号不存在或密码错误,请联系管理员!</font>")
        .expect(1)
        .create_async()
        .await;

    let mut manager = auth(&server, &["aaaa", "bbbb", "cccc"]);
    manager.establish_session().await.unwrap();
    let result = manager.attempt_login(3).await;

    assert!(matches!(
        result,
        Err(AppError::Auth(AuthError::WrongPassword))
    ));
    assert_eq!(manager.state(), AuthState::LoginFailed);
    captcha.assert_async().await;
}

#[tokio::test]
async fn test_missing_captcha_consumes_every_attempt() {
    let mut server = Server::new_async().await;
    let _root = server
        .mock("GET", "/jsxsd/")
        .with_status(200)
        .create_async()
        .await;
    let captcha = server
        .mock("GET", "/jsxsd/verifycode.servlet")
        .with_status(200)
        .with_body(vec![1])
        .expect(3)
        .create_async()
        .await;
    let login = server
        .mock("POST", "/jsxsd/xk/LoginToXkLdap")
        .expect(0)
        .create_async()
        .await;

    let mut manager = auth(&server, &[]);
    manager.establish_session().await.unwrap();
    let result = manager.attempt_login(3).await;

    assert!(matches!(
        result,
        Err(AppError::Auth(AuthError::RetriesExhausted { attempts: 3 }))
    ));
    captcha.assert_async().await;
    login.assert_async().await;
}

#[tokio::test]
async fn test_login_requires_session_cookie() {
    let server = Server::new_async().await;
    let mut manager = auth(&server, &["aaaa"]);
    let result = manager.attempt_login(3).await;
    assert!(matches!(result, Err(AppError::Auth(AuthError::NoSession))));
}

#[tokio::test]
async fn test_home_unreachable_after_login_fails_without_retry() {
    let mut server = Server::new_async().await;
    let _root = server
        .mock("GET", "/jsxsd/")
        .with_status(200)
        .create_async()
        .await;
    let captcha = server
        .mock("GET", "/jsxsd/verifycode.servlet")
        .with_status(200)
        .with_body(vec![1, 2, 3])
        .expect(1)
        .create_async()
        .await;
    let login = server
        .mock("POST", "/jsxsd/xk/LoginToXkLdap")
        .with_status(200)
        .with_body("<html>跳转中</html>")
        .expect(1)
        .create_async()
        .await;
    let _home = server
        .mock("GET", "/jsxsd/framework/xsMain.jsp")
        .with_status(302)
        .with_header("location", "/jsxsd/")
        .create_async()
        .await;

    let mut manager = auth(&server, &["aaaa", "bbbb", "cccc"]);
    manager.establish_session().await.unwrap();
    let result = manager.attempt_login(3).await;

    assert!(matches!(
        result,
        Err(AppError::Auth(AuthError::HomeUnreachable))
    ));
    assert_eq!(manager.state(), AuthState::LoginFailed);
    captcha.assert_async().await;
    login.assert_async().await;
}

#[tokio::test]
async fn test_expired_session_logs_in_again() {
    let mut server = Server::new_async().await;
    let _root = server
        .mock("GET", "/jsxsd/")
        .with_status(200)
        .with_header("set-cookie", "JSESSIONID=s0; Path=/")
        .create_async()
        .await;
    let captcha = server
        .mock("GET", "/jsxsd/verifycode.servlet")
        .with_status(200)
        .with_body(vec![1, 2, 3])
        .expect(2)
        .create_async()
        .await;
    let first_login = server
        .mock("POST", "/jsxsd/xk/LoginToXkLdap")
        .match_body(Matcher::UrlEncoded("RANDOMCODE".into(), "aaaa".into()))
        .with_status(200)
        .with_header("set-cookie", "JSESSIONID=s1; Path=/")
        .with_body("<html>跳转中</html>")
        .expect(1)
        .create_async()
        .await;
    let second_login = server
        .mock("POST", "/jsxsd/xk/LoginToXkLdap")
        .match_body(Matcher::UrlEncoded("RANDOMCODE".into(), "bbbb".into()))
        .with_status(200)
        .with_header("set-cookie", "JSESSIONID=s2; Path=/")
        .with_body("<html>跳转中</html>")
        .expect(1)
        .create_async()
        .await;
    let first_home = server
        .mock("GET", "/jsxsd/framework/xsMain.jsp")
        .match_header("cookie", Matcher::Regex("JSESSIONID=s1".into()))
        .with_status(200)
        .with_body("<html>学生个人中心</html>")
        .create_async()
        .await;
    let _second_home = server
        .mock("GET", "/jsxsd/framework/xsMain.jsp")
        .match_header("cookie", Matcher::Regex("JSESSIONID=s2".into()))
        .with_status(200)
        .with_body("<html>学生个人中心</html>")
        .create_async()
        .await;

    let mut manager = auth(&server, &["aaaa", "bbbb"]);
    manager.establish_session().await.unwrap();
    manager.attempt_login(3).await.unwrap();
    assert_eq!(manager.state(), AuthState::Authenticated);

    // 服务器端会话失效，主页改为跳回登录页
    first_home.remove_async().await;
    let _expired = server
        .mock("GET", "/jsxsd/framework/xsMain.jsp")
        .match_header("cookie", Matcher::Regex("JSESSIONID=s1".into()))
        .with_status(302)
        .with_header("location", "/jsxsd/")
        .create_async()
        .await;

    assert!(!manager.check_session_alive().await);
    assert_eq!(manager.state(), AuthState::SessionExpired);

    manager.ensure_session(3).await.unwrap();
    assert_eq!(manager.state(), AuthState::Authenticated);
    assert!(manager.check_session_alive().await);

    captcha.assert_async().await;
    first_login.assert_async().await;
    second_login.assert_async().await;
}

#[tokio::test]
async fn test_redirect_means_session_dead() {
    let mut server = Server::new_async().await;
    let _home = server
        .mock("GET", "/jsxsd/framework/xsMain.jsp")
        .with_status(302)
        .with_header("location", "/jsxsd/")
        .create_async()
        .await;
    let root = server
        .mock("GET", "/jsxsd/")
        .expect(0)
        .create_async()
        .await;

    let mut manager = auth(&server, &[]);
    assert!(!manager.check_session_alive().await);
    assert!(!manager.check_session_alive().await);
    assert_eq!(manager.state(), AuthState::Anonymous);
    root.assert_async().await;
}

#[tokio::test]
async fn test_live_session_check_is_repeatable() {
    let mut server = Server::new_async().await;
    let home = server
        .mock("GET", "/jsxsd/framework/xsMain.jsp")
        .with_status(200)
        .with_body("<html>学生个人中心</html>")
        .expect(2)
        .create_async()
        .await;

    let mut manager = auth(&server, &[]);
    assert!(manager.check_session_alive().await);
    assert!(manager.check_session_alive().await);
    assert_eq!(manager.state(), AuthState::Anonymous);
    home.assert_async().await;
}

#[tokio::test]
async fn test_login_page_body_means_session_dead() {
    let mut server = Server::new_async().await;
    let _home = server
        .mock("GET", "/jsxsd/framework/xsMain.jsp")
        .with_status(200)
        .with_body("<title>用户登录</title>")
        .create_async()
        .await;

    let mut manager = auth(&server, &[]);
    assert!(!manager.check_session_alive().await);
}

#[tokio::test]
async fn test_unreachable_portal_is_not_alive() {
    let session = PortalSession::new("http://127.0.0.1:9", Duration::from_secs(1)).unwrap();
    let credentials = Credentials::new("S12345", "hunter2").unwrap();
    let mut manager = AuthManager::new(session, credentials, ScriptedSolver::new(&[]));
    assert!(!manager.check_session_alive().await);
    assert!(manager.establish_session().await.is_err());
    assert_eq!(manager.state(), AuthState::Anonymous);
}

// ========== 批次发现 ==========

#[tokio::test]
async fn test_batch_discovery() {
    let mut server = Server::new_async().await;
    let _find = server
        .mock("GET", "/jsxsd/xspj/xspj_find.do")
        .with_status(200)
        .with_body(
            r#"<table><tr><td>2024-2025-2</td><td>期末评教</td>
<td><a href="/jsxsd/xspj/xspj_list.do?pj0502id=B1&amp;pj01id=&amp;xnxq01id=2024-2025-2" title="点击进入评价">进入评价</a></td></tr></table>"#,
        )
        .create_async()
        .await;
    let _list = server
        .mock("GET", Matcher::Regex(LIST_PATTERN.to_string()))
        .with_status(200)
        .with_body(render_page(1, 2, ""))
        .create_async()
        .await;

    let discovery = BatchDiscovery::new(session(&server));
    let path = discovery.get_batch_path().await.unwrap();
    assert_eq!(path, BATCH_PATH);

    let params = discovery.get_hidden_params(&path).await.unwrap();
    assert_eq!(params.batch_id, "B1");
    assert_eq!(params.round_id, "R1");
    assert_eq!(params.term_id, "T1");
    assert_eq!(params.person_id, "P1");
    assert_eq!(params.form_id, "F1");
}

#[tokio::test]
async fn test_batch_link_missing() {
    let mut server = Server::new_async().await;
    let _find = server
        .mock("GET", "/jsxsd/xspj/xspj_find.do")
        .with_status(200)
        .with_body("<p>当前没有开放的评价批次</p>")
        .create_async()
        .await;

    let discovery = BatchDiscovery::new(session(&server));
    let result = discovery.get_batch_path().await;
    assert!(matches!(
        result,
        Err(AppError::Markup(MarkupError::BatchLinkNotFound))
    ));
}

// ========== 列表收集 ==========

#[tokio::test]
async fn test_harvest_known_page_count() {
    let mut server = Server::new_async().await;
    let _first = server
        .mock("GET", Matcher::Regex(LIST_PATTERN.to_string()))
        .with_status(200)
        .with_body(render_page(1, 2, "共 3 页"))
        .create_async()
        .await;
    for index in 2..=3 {
        server
            .mock("POST", Matcher::Regex(LIST_PATTERN.to_string()))
            .match_body(Matcher::AllOf(vec![
                page_index(index),
                Matcher::UrlEncoded("pj0502id".into(), "B1".into()),
            ]))
            .with_status(200)
            .with_body(render_page(index, 2, "共 3 页"))
            .expect(1)
            .create_async()
            .await;
    }

    let entries = ListHarvester::new(session(&server))
        .get_evaluation_list(BATCH_PATH)
        .await
        .unwrap();

    let hrefs: Vec<&str> = entries.iter().map(|e| e.operation_href.as_str()).collect();
    assert_eq!(
        hrefs,
        vec![
            "/jsxsd/xspj/xspj_edit.do?id=1_1",
            "/jsxsd/xspj/xspj_edit.do?id=1_2",
            "/jsxsd/xspj/xspj_edit.do?id=2_1",
            "/jsxsd/xspj/xspj_edit.do?id=2_2",
            "/jsxsd/xspj/xspj_edit.do?id=3_1",
            "/jsxsd/xspj/xspj_edit.do?id=3_2",
        ]
    );
    assert_eq!(entries[2].course, "课程2-1");
    assert_eq!(entries[2].teacher, "教师2-1");
}

#[tokio::test]
async fn test_harvest_skips_failed_page() {
    let mut server = Server::new_async().await;
    let _first = server
        .mock("GET", Matcher::Regex(LIST_PATTERN.to_string()))
        .with_status(200)
        .with_body(render_page(1, 2, "共 3 页"))
        .create_async()
        .await;
    let _broken = server
        .mock("POST", Matcher::Regex(LIST_PATTERN.to_string()))
        .match_body(page_index(2))
        .with_status(500)
        .create_async()
        .await;
    let _last = server
        .mock("POST", Matcher::Regex(LIST_PATTERN.to_string()))
        .match_body(page_index(3))
        .with_status(200)
        .with_body(render_page(3, 2, "共 3 页"))
        .create_async()
        .await;

    let entries = ListHarvester::new(session(&server))
        .get_evaluation_list(BATCH_PATH)
        .await
        .unwrap();

    assert_eq!(entries.len(), 4);
    assert_eq!(entries[2].operation_href, "/jsxsd/xspj/xspj_edit.do?id=3_1");
}

#[tokio::test]
async fn test_harvest_skips_page_without_table() {
    let mut server = Server::new_async().await;
    let _first = server
        .mock("GET", Matcher::Regex(LIST_PATTERN.to_string()))
        .with_status(200)
        .with_body(render_page(1, 2, "共 3 页"))
        .create_async()
        .await;
    let blank = server
        .mock("POST", Matcher::Regex(LIST_PATTERN.to_string()))
        .match_body(page_index(2))
        .with_status(200)
        .with_body("<html><body><p>系统繁忙，请稍后再试</p></body></html>")
        .expect(1)
        .create_async()
        .await;
    let _last = server
        .mock("POST", Matcher::Regex(LIST_PATTERN.to_string()))
        .match_body(page_index(3))
        .with_status(200)
        .with_body(render_page(3, 2, "共 3 页"))
        .create_async()
        .await;

    let entries = ListHarvester::new(session(&server))
        .get_evaluation_list(BATCH_PATH)
        .await
        .unwrap();

    let hrefs: Vec<&str> = entries.iter().map(|e| e.operation_href.as_str()).collect();
    assert_eq!(
        hrefs,
        vec![
            "/jsxsd/xspj/xspj_edit.do?id=1_1",
            "/jsxsd/xspj/xspj_edit.do?id=1_2",
            "/jsxsd/xspj/xspj_edit.do?id=3_1",
            "/jsxsd/xspj/xspj_edit.do?id=3_2",
        ]
    );
    blank.assert_async().await;
}

#[tokio::test]
async fn test_harvest_probes_until_repeat() {
    let mut server = Server::new_async().await;
    let next = r#"<a href="javascript:void(0)">下一页</a>"#;
    let _first = server
        .mock("GET", Matcher::Regex(LIST_PATTERN.to_string()))
        .with_status(200)
        .with_body(render_page(1, 2, next))
        .create_async()
        .await;
    let _second = server
        .mock("POST", Matcher::Regex(LIST_PATTERN.to_string()))
        .match_body(page_index(2))
        .with_status(200)
        .with_body(render_page(2, 1, next))
        .create_async()
        .await;
    // 越过末页时服务器重复返回最后一页
    let _repeat = server
        .mock("POST", Matcher::Regex(LIST_PATTERN.to_string()))
        .match_body(page_index(3))
        .with_status(200)
        .with_body(render_page(2, 1, next))
        .expect(1)
        .create_async()
        .await;
    let beyond = server
        .mock("POST", Matcher::Regex(LIST_PATTERN.to_string()))
        .match_body(page_index(4))
        .expect(0)
        .create_async()
        .await;

    let entries = ListHarvester::new(session(&server))
        .get_evaluation_list(BATCH_PATH)
        .await
        .unwrap();

    assert_eq!(entries.len(), 3);
    beyond.assert_async().await;
}

#[tokio::test]
async fn test_harvest_probe_limit() {
    let mut server = Server::new_async().await;
    let next = "下一页";
    let _first = server
        .mock("GET", Matcher::Regex(LIST_PATTERN.to_string()))
        .with_status(200)
        .with_body(render_page(1, 1, next))
        .create_async()
        .await;
    for index in 2..=4 {
        server
            .mock("POST", Matcher::Regex(LIST_PATTERN.to_string()))
            .match_body(page_index(index))
            .with_status(200)
            .with_body(render_page(index, 1, next))
            .create_async()
            .await;
    }

    let entries = ListHarvester::new(session(&server))
        .with_max_page_probes(3)
        .get_evaluation_list(BATCH_PATH)
        .await
        .unwrap();

    assert_eq!(entries.len(), 3);
}

#[tokio::test]
async fn test_harvest_single_page() {
    let mut server = Server::new_async().await;
    let _first = server
        .mock("GET", Matcher::Regex(LIST_PATTERN.to_string()))
        .with_status(200)
        .with_body(render_page(1, 3, ""))
        .create_async()
        .await;
    let posts = server
        .mock("POST", Matcher::Regex(LIST_PATTERN.to_string()))
        .expect(0)
        .create_async()
        .await;

    let entries = ListHarvester::new(session(&server))
        .get_evaluation_list(BATCH_PATH)
        .await
        .unwrap();

    assert_eq!(entries.len(), 3);
    posts.assert_async().await;
}

#[tokio::test]
async fn test_harvest_ignores_next_page_script_definition() {
    let mut server = Server::new_async().await;
    let script = "<script>function nextPage() { document.forms[0].submit(); }</script>";
    let _first = server
        .mock("GET", Matcher::Regex(LIST_PATTERN.to_string()))
        .with_status(200)
        .with_body(render_page(1, 2, script))
        .create_async()
        .await;
    let posts = server
        .mock("POST", Matcher::Regex(LIST_PATTERN.to_string()))
        .expect(0)
        .create_async()
        .await;

    let entries = ListHarvester::new(session(&server))
        .get_evaluation_list(BATCH_PATH)
        .await
        .unwrap();

    assert_eq!(entries.len(), 2);
    posts.assert_async().await;
}

// ========== 提交 ==========

fn two_indicator_page() -> String {
    let mut rows = String::new();
    for i in 1..=2 {
        rows.push_str(&format!(
            r#"<tr><td>指标{i}<input type="hidden" name="pj06xh" value="{i}"/></td><td name="zbtd">
<input type="radio" name="pj0601id_{i}" value="A{i}"/>优(10)<input type="hidden" name="pj0601fz_{i}_A{i}" value="10"/>
<input type="radio" name="pj0601id_{i}" value="B{i}"/>良(8)<input type="hidden" name="pj0601fz_{i}_B{i}" value="8"/>
</td></tr>"#
        ));
    }
    format!(
        r#"<html><body><form id="Form1" method="post">
<input type="hidden" name="pj0502id" value="B1"/>
<input type="hidden" name="issubmit" value="0"/>
<table>{rows}</table></form></body></html>"#
    )
}

#[tokio::test]
async fn test_evaluation_flow_submits_strategy() {
    let mut server = Server::new_async().await;
    let _form = server
        .mock("GET", Matcher::Regex(EDIT_PATTERN.to_string()))
        .with_status(200)
        .with_body(two_indicator_page())
        .create_async()
        .await;
    let save = server
        .mock("POST", "/jsxsd/xspj/xspj_save.do")
        .match_body(Matcher::AllOf(vec![
            Matcher::UrlEncoded("pj0502id".into(), "B1".into()),
            Matcher::UrlEncoded("issubmit".into(), "1".into()),
            Matcher::UrlEncoded("pj0601id_1".into(), "A1".into()),
            Matcher::UrlEncoded("pj0601id_2".into(), "B2".into()),
            Matcher::UrlEncoded("pj0601fz_2_B2".into(), "8".into()),
        ]))
        .with_status(200)
        .with_body("<script>alert('保存成功!');window.close();</script>")
        .expect(1)
        .create_async()
        .await;

    let _list = server
        .mock("GET", Matcher::Regex(LIST_PATTERN.to_string()))
        .with_status(200)
        .with_body(render_page(1, 1, ""))
        .create_async()
        .await;

    let entries = ListHarvester::new(session(&server))
        .get_evaluation_list(BATCH_PATH)
        .await
        .unwrap();

    let flow = EvaluationFlow::new(EvaluationService::new(session(&server)));
    let strategy = ScoringStrategy::new("mixed", "", vec!["优".to_string(), "良".to_string()]);
    let ctx = EvaluationCtx::new(&entries[0], 0, entries.len());

    let result = flow.run(&entries[0], &ctx, &strategy).await.unwrap();
    assert_eq!(result, FlowResult::Saved);
    save.assert_async().await;
}

#[tokio::test]
async fn test_strategy_mismatch_does_not_submit() {
    let mut server = Server::new_async().await;
    let _list = server
        .mock("GET", Matcher::Regex(LIST_PATTERN.to_string()))
        .with_status(200)
        .with_body(render_page(1, 1, ""))
        .create_async()
        .await;
    let _form = server
        .mock("GET", Matcher::Regex(EDIT_PATTERN.to_string()))
        .with_status(200)
        .with_body(two_indicator_page())
        .create_async()
        .await;
    let save = server
        .mock("POST", "/jsxsd/xspj/xspj_save.do")
        .expect(0)
        .create_async()
        .await;

    let entries = ListHarvester::new(session(&server))
        .get_evaluation_list(BATCH_PATH)
        .await
        .unwrap();
    let flow = EvaluationFlow::new(EvaluationService::new(session(&server)));
    let strategy = ScoringStrategy::preset("scenario_98").unwrap();
    let ctx = EvaluationCtx::new(&entries[0], 0, 1);

    let result = flow.run(&entries[0], &ctx, &strategy).await;
    assert!(matches!(result, Err(AppError::Strategy(_))));
    save.assert_async().await;
}

#[tokio::test]
async fn test_rejected_save_reports_alert() {
    let mut server = Server::new_async().await;
    let _save = server
        .mock("POST", "/jsxsd/xspj/toSavepj03wjpj.do")
        .match_body(Matcher::AllOf(vec![
            Matcher::UrlEncoded("pj03id".into(), "F1".into()),
            Matcher::UrlEncoded("jynr".into(), "A.".into()),
            Matcher::UrlEncoded("pageIndex".into(), "1".into()),
        ]))
        .with_status(200)
        .with_body("<script>alert('评价已截止');</script>")
        .create_async()
        .await;
    let _list = server
        .mock("GET", Matcher::Regex(LIST_PATTERN.to_string()))
        .with_status(200)
        .with_body(render_page(1, 1, ""))
        .create_async()
        .await;

    let params = BatchDiscovery::new(session(&server))
        .get_hidden_params(BATCH_PATH)
        .await
        .unwrap();
    let outcome = EvaluationService::new(session(&server))
        .submit_text_evaluation(&params)
        .await
        .unwrap();

    assert!(!outcome.success);
    assert_eq!(outcome.message, "评价已截止");
}

// ========== 真实环境 ==========

#[tokio::test]
#[ignore] // 默认忽略，需要手动运行：cargo test -- --ignored
async fn test_live_login() {
    let config = Config::from_env().expect("加载配置失败");
    let session = PortalSession::from_config(&config).expect("创建会话失败");
    let credentials = config.credentials().expect("读取账号失败");
    let resolver = CaptchaResolver::from_config(&config).expect("创建验证码解析器失败");

    let mut manager = AuthManager::new(session, credentials, resolver);
    manager.establish_session().await.expect("无法访问教务系统");
    manager
        .attempt_login(config.login_max_retries)
        .await
        .expect("登录失败");

    assert!(manager.check_session_alive().await, "登录后应该能访问主页");
}
