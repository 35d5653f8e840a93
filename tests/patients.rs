mod common;

use anyhow::Result;
use axum::http::StatusCode;
use common::{assert_close, patient_body, TestApp, GESTOR, PROF1, PROF2};
use serde_json::json;

#[tokio::test]
async fn ganhos_calculados_no_servidor() -> Result<()> {
    let app = TestApp::spawn().await?;
    let token = app.login(GESTOR).await?;

    // base/ganho enviados pelo cliente são ignorados
    let mut body = patient_body("Maria Silva", app.prof1_id);
    body["base"] = json!(9999);
    body["ganho"] = json!(9999);
    let (status, created) = app.post("/patients", &token, body).await?;
    assert_eq!(status, StatusCode::CREATED);
    assert_close(&created["data"]["base"], 120.0);
    assert_close(&created["data"]["ganho"], 102.0);
    assert_eq!(created["data"]["profissional_nome"], "Profissional Silva");
    assert_eq!(created["data"]["ganho_fixo"], json!(null));
    Ok(())
}

#[tokio::test]
async fn ganho_fixo_e_experimental() -> Result<()> {
    let app = TestApp::spawn().await?;
    let token = app.login(GESTOR).await?;

    let mut body = patient_body("Pedro Costa", app.prof1_id);
    body["ganho_fixo"] = json!(77.77);
    let (_, created) = app.post("/patients", &token, body).await?;
    assert_close(&created["data"]["base"], 120.0);
    assert_close(&created["data"]["ganho"], 77.77);

    let mut body = patient_body("Ana Experimental", app.prof1_id);
    body["tipo"] = json!("experimental");
    body["ganho_fixo"] = json!(50);
    let (status, created) = app.post("/patients", &token, body).await?;
    assert_eq!(status, StatusCode::CREATED);
    assert_close(&created["data"]["valor"], 0.0);
    assert_close(&created["data"]["porcentagem"], 0.0);
    assert_close(&created["data"]["base"], 0.0);
    assert_close(&created["data"]["ganho"], 0.0);
    assert_eq!(created["data"]["ganho_fixo"], json!(null));
    Ok(())
}

#[tokio::test]
async fn atualizacao_recalcula_ganhos() -> Result<()> {
    let app = TestApp::spawn().await?;
    let token = app.login(GESTOR).await?;
    let id = app.create_patient(&token, "Maria Silva", app.prof1_id).await?;

    let mut body = patient_body("Maria Silva", app.prof2_id);
    body["valor"] = json!(350);
    body["porcentagem"] = json!(25);
    let (status, updated) = app.put(&format!("/patients/{}", id), &token, body).await?;
    assert_eq!(status, StatusCode::OK);
    assert_close(&updated["data"]["base"], 87.5);
    assert_close(&updated["data"]["ganho"], 74.375);
    assert_eq!(updated["data"]["profissional_id"], app.prof2_id);
    Ok(())
}

#[tokio::test]
async fn profissional_so_ve_os_seus_alunos() -> Result<()> {
    let app = TestApp::spawn().await?;
    let gestor = app.login(GESTOR).await?;
    let prof1 = app.login(PROF1).await?;
    let prof2 = app.login(PROF2).await?;

    let do_prof1 = app.create_patient(&gestor, "Maria Silva", app.prof1_id).await?;
    app.create_patient(&gestor, "João Santos", app.prof2_id).await?;

    let (_, list) = app.get("/patients", &prof1).await?;
    let list = list["data"].as_array().cloned().unwrap_or_default();
    assert_eq!(list.len(), 1);
    assert_eq!(list[0]["id"], do_prof1);
    assert_eq!(list[0]["total_attendance"], 0);
    assert_eq!(list[0]["total_evolutions"], 0);

    let (_, all) = app.get("/patients", &gestor).await?;
    assert_eq!(all["data"].as_array().map(Vec::len), Some(2));

    let uri = format!("/patients/{}", do_prof1);
    let (status, body) = app.get(&uri, &prof2).await?;
    assert_eq!(status, StatusCode::FORBIDDEN);
    assert_eq!(body["message"], "Sem permissão para acessar este aluno");

    let (status, body) = app.get(&uri, &gestor).await?;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["data"]["attendance"], json!([]));
    assert_eq!(body["data"]["evolutions"], json!([]));

    let (status, _) = app.delete(&uri, &prof2).await?;
    assert_eq!(status, StatusCode::FORBIDDEN);
    Ok(())
}

#[tokio::test]
async fn aluno_inexistente_da_404_antes_de_403() -> Result<()> {
    let app = TestApp::spawn().await?;
    let prof = app.login(PROF1).await?;
    let (status, body) = app.get("/patients/9999", &prof).await?;
    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(body["message"], "Aluno não encontrado");

    let (status, _) = app.get("/patients/9999/attendance", &prof).await?;
    assert_eq!(status, StatusCode::NOT_FOUND);
    Ok(())
}

#[tokio::test]
async fn profissional_nao_cadastra_nem_transfere_para_outro() -> Result<()> {
    let app = TestApp::spawn().await?;
    let prof1 = app.login(PROF1).await?;

    let (status, _) = app
        .post("/patients", &prof1, patient_body("Outro", app.prof2_id))
        .await?;
    assert_eq!(status, StatusCode::FORBIDDEN);

    let id = app.create_patient(&prof1, "Maria Silva", app.prof1_id).await?;
    let (status, _) = app
        .put(
            &format!("/patients/{}", id),
            &prof1,
            patient_body("Maria Silva", app.prof2_id),
        )
        .await?;
    assert_eq!(status, StatusCode::FORBIDDEN);
    Ok(())
}

#[tokio::test]
async fn validacao_do_aluno() -> Result<()> {
    let app = TestApp::spawn().await?;
    let token = app.login(GESTOR).await?;

    let mut body = patient_body("Maria Silva", app.prof1_id);
    body["tipo"] = json!("mensal");
    let (status, body) = app.post("/patients", &token, body).await?;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["success"], false);

    let mut body = patient_body("Maria Silva", app.prof1_id);
    body["porcentagem"] = json!(150);
    body["dias"] = json!([]);
    let (status, body) = app.post("/patients", &token, body).await?;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    let fields: Vec<&str> = body["errors"]
        .as_array()
        .map(|errors| errors.iter().filter_map(|e| e["field"].as_str()).collect())
        .unwrap_or_default();
    assert_eq!(fields, vec!["dias", "porcentagem"]);

    // o gestor não pode atribuir a si próprio: não é profissional
    let (status, body) = app
        .post("/patients", &token, patient_body("Maria Silva", app.gestor_id))
        .await?;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["errors"][0]["field"], "profissional_id");
    Ok(())
}

#[tokio::test]
async fn estatisticas_contam_cada_aluno_uma_vez() -> Result<()> {
    let app = TestApp::spawn().await?;
    let gestor = app.login(GESTOR).await?;
    let prof1 = app.login(PROF1).await?;

    let a = app.create_patient(&gestor, "Maria Silva", app.prof1_id).await?;
    app.create_patient(&gestor, "João Santos", app.prof2_id).await?;

    for (date, status) in [("2025-02-03", "present"), ("2025-02-05", "present"), ("2025-02-07", "absent"), ("2025-02-10", "makeup")] {
        let (code, _) = app
            .post(
                &format!("/patients/{}/attendance", a),
                &gestor,
                json!({ "date": date, "status": status }),
            )
            .await?;
        assert_eq!(code, StatusCode::CREATED);
    }

    let (status, body) = app.get("/patients/stats", &prof1).await?;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["data"]["totalAlunos"], 1);
    assert_close(&body["data"]["ganhoTotal"], 102.0);
    assert_eq!(body["data"]["presencas"], 2);
    assert_eq!(body["data"]["faltas"], 1);
    assert_close(&body["data"]["taxaPresenca"], 66.67);

    let (_, body) = app.get("/patients/stats", &gestor).await?;
    assert_eq!(body["data"]["totalAlunos"], 2);
    assert_close(&body["data"]["ganhoTotal"], 204.0);
    Ok(())
}

#[tokio::test]
async fn excluir_aluno_apaga_registos_filhos() -> Result<()> {
    let app = TestApp::spawn().await?;
    let token = app.login(GESTOR).await?;
    let id = app.create_patient(&token, "Maria Silva", app.prof1_id).await?;
    app.post(
        &format!("/patients/{}/attendance", id),
        &token,
        json!({ "date": "2025-02-03", "status": "present" }),
    )
    .await?;

    let (status, body) = app.delete(&format!("/patients/{}", id), &token).await?;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["message"], "Aluno excluído com sucesso");

    let remaining: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM attendance")
        .fetch_one(&app.pool)
        .await?;
    assert_eq!(remaining, 0);
    Ok(())
}

#[tokio::test]
async fn valor_absurdo_e_recusado_sem_gravar() -> Result<()> {
    let app = TestApp::spawn().await?;
    let token = app.login(GESTOR).await?;

    let mut body = patient_body("Maria Silva", app.prof1_id);
    body["valor"] = json!(1e308);
    body["porcentagem"] = json!(100);
    let (status, resposta) = app.post("/patients", &token, body).await?;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(resposta["errors"][0]["field"], "valor");

    let (_, lista) = app.get("/patients", &token).await?;
    assert_eq!(lista["data"].as_array().map(Vec::len), Some(0));
    Ok(())
}

#[tokio::test]
async fn valores_em_texto_sao_aceites() -> Result<()> {
    let app = TestApp::spawn().await?;
    let token = app.login(GESTOR).await?;

    let mut body = patient_body("Maria Silva", app.prof1_id);
    body["valor"] = json!("400");
    body["porcentagem"] = json!("30");
    let (status, created) = app.post("/patients", &token, body).await?;
    assert_eq!(status, StatusCode::CREATED, "{}", created);
    assert_close(&created["data"]["valor"], 400.0);
    assert_close(&created["data"]["ganho"], 102.0);

    let mut body = patient_body("Pedro Costa", app.prof1_id);
    body["valor"] = json!("quatrocentos");
    let (status, resposta) = app.post("/patients", &token, body).await?;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(resposta["errors"][0]["field"], "valor");
    Ok(())
}
