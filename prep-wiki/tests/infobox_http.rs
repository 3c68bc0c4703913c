use prep_wiki::{WikiClient, WikiError};
use wiremock::matchers::{header, method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

const EXAMPLE_CORP_PAGE: &str = r#"<!DOCTYPE html>
<html><head><title>Example Corp</title></head><body>
<table class="infobox ib-company vcard"><tbody>
<tr><td class="infobox-image" colspan="2"><img src="//img.example/logo.png"></td></tr>
<tr><th>Founded</th><td>1999</td></tr>
</tbody></table>
</body></html>"#;

fn client_for(server: &MockServer) -> WikiClient {
    WikiClient::with_base_url(&format!("{}/wiki/", server.uri())).unwrap()
}

#[tokio::test]
async fn example_corp_end_to_end() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/wiki/Example_Corp"))
        .and(header("user-agent", "Mozilla/5.0"))
        .and(header("accept-language", "en-US,en;q=0.9"))
        .respond_with(ResponseTemplate::new(200).set_body_string(EXAMPLE_CORP_PAGE))
        .expect(1)
        .mount(&server)
        .await;

    let infobox = client_for(&server).infobox("Example Corp").await.unwrap();

    assert_eq!(infobox.rows.len(), 1);
    assert_eq!(infobox.rows[0].label, "Founded");
    assert_eq!(infobox.rows[0].value, "1999");
    assert_eq!(infobox.image.as_deref(), Some("https://img.example/logo.png"));
}

#[tokio::test]
async fn missing_page_is_a_fetch_error() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/wiki/No_Such_Company"))
        .respond_with(ResponseTemplate::new(404).set_body_string("<html>not found</html>"))
        .expect(1) // single attempt, never retried
        .mount(&server)
        .await;

    let err = client_for(&server)
        .infobox("No Such Company")
        .await
        .unwrap_err();

    assert!(matches!(err, WikiError::Fetch { .. }));
}

#[tokio::test]
async fn page_without_fact_table_is_no_infobox() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/wiki/Plain_Article"))
        .respond_with(ResponseTemplate::new(200).set_body_string(
            "<html><body><p>An article with no summary panel.</p></body></html>",
        ))
        .mount(&server)
        .await;

    let err = client_for(&server)
        .infobox("Plain Article")
        .await
        .unwrap_err();

    match err {
        WikiError::NoInfobox(subject) => assert_eq!(subject, "Plain Article"),
        other => panic!("expected NoInfobox, got {other:?}"),
    }
}

#[tokio::test]
async fn reserved_characters_in_subjects_are_percent_encoded() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/wiki/AT%26T"))
        .respond_with(ResponseTemplate::new(200).set_body_string(
            r#"<html><body><table class="infobox vcard"><tbody>
            <tr><th>Industry</th><td>Telecommunications</td></tr>
            </tbody></table></body></html>"#,
        ))
        .expect(1)
        .mount(&server)
        .await;

    let infobox = client_for(&server).infobox("AT&T").await.unwrap();

    assert_eq!(infobox.rows[0].label, "Industry");
}
