//! Shortlisting pipeline coordinator.
//!
//! One invocation: load the job and caller-owned candidate set, embed the
//! job once, score and analyze every candidate in input order, persist the
//! run and its results in a single transaction, and assemble the report.

use sqlx::PgPool;
use tracing::info;
use uuid::Uuid;

use crate::errors::AppError;
use crate::llm_client::LlmClient;
use crate::matching::analyzer::MatchAnalyzer;
use crate::matching::similarity::cosine_similarity;
use crate::models::cv::CvRow;
use crate::models::job::JobDescriptionRow;
use crate::models::shortlist::{
    ShortlistDetail, ShortlistReport, ShortlistResultRow, ShortlistRow,
};

/// Runs one shortlisting invocation for `owner_id`.
///
/// The job and every candidate CV must belong to the caller; any unresolved
/// id rejects the whole call before processing starts. Provider failure on
/// the job embedding aborts the run (there is no fallback embedding);
/// analyzer failures degrade per candidate and never abort. All rows commit
/// atomically — a failed run leaves nothing behind.
pub async fn run_shortlisting(
    pool: &PgPool,
    llm: &LlmClient,
    analyzer: &MatchAnalyzer,
    owner_id: &str,
    job_description_id: Uuid,
    cv_ids: &[Uuid],
    threshold: f64,
) -> Result<ShortlistReport, AppError> {
    if !(0.0..=1.0).contains(&threshold) {
        return Err(AppError::Validation(format!(
            "threshold must be within [0, 1], got {threshold}"
        )));
    }
    if cv_ids.is_empty() {
        return Err(AppError::Validation(
            "no candidate CVs provided".to_string(),
        ));
    }

    let job = fetch_owned_job(pool, owner_id, job_description_id).await?;
    let cvs = fetch_owned_cvs(pool, owner_id, cv_ids).await?;

    // The job embedding is computed once per run, never cached across runs,
    // since job content can change between runs. CV embeddings were computed
    // at ingestion and are reused as stored.
    let job_embedding = llm
        .embed(&job.content)
        .await
        .map_err(|e| AppError::Provider(format!("job embedding failed: {e}")))?;

    let shortlist_id = Uuid::new_v4();
    let mut results = Vec::with_capacity(cv_ids.len());

    for (position, cv) in cvs.iter().enumerate() {
        let score = cosine_similarity(&cv.embedding.0, &job_embedding);
        let assessment = analyzer.analyze(&cv.content, &job.content, score).await;

        results.push(ShortlistResultRow {
            id: Uuid::new_v4(),
            shortlist_id,
            cv_id: cv.id,
            position: position as i32,
            score,
            match_summary: assessment.match_summary,
            strengths: assessment.strengths,
            gaps: assessment.gaps,
            reasoning: assessment.reasoning,
            recommendation: assessment.recommendation,
        });
    }

    // All-or-nothing: the run and its results land in one transaction
    let mut tx = pool.begin().await?;

    sqlx::query(
        "INSERT INTO shortlists (id, owner_id, job_description_id, threshold) \
         VALUES ($1, $2, $3, $4)",
    )
    .bind(shortlist_id)
    .bind(owner_id)
    .bind(job_description_id)
    .bind(threshold)
    .execute(&mut *tx)
    .await?;

    for result in &results {
        sqlx::query(
            r#"
            INSERT INTO shortlist_results
                (id, shortlist_id, cv_id, position, score, match_summary,
                 strengths, gaps, reasoning, recommendation)
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10)
            "#,
        )
        .bind(result.id)
        .bind(result.shortlist_id)
        .bind(result.cv_id)
        .bind(result.position)
        .bind(result.score)
        .bind(&result.match_summary)
        .bind(&result.strengths)
        .bind(&result.gaps)
        .bind(&result.reasoning)
        .bind(&result.recommendation)
        .execute(&mut *tx)
        .await?;
    }

    tx.commit().await?;

    let report = assemble_report(shortlist_id, job, results, threshold);
    info!(
        "shortlist run {shortlist_id} complete: {} candidates, {} shortlisted, {} rejected",
        report.total_candidates, report.shortlisted_count, report.rejected_count
    );

    Ok(report)
}

/// Splits scored results at the threshold, inclusive at the boundary.
/// Input order is preserved within each partition.
pub fn partition_by_threshold(
    results: Vec<ShortlistResultRow>,
    threshold: f64,
) -> (Vec<ShortlistResultRow>, Vec<ShortlistResultRow>) {
    results.into_iter().partition(|r| r.score >= threshold)
}

fn assemble_report(
    shortlist_id: Uuid,
    job_description: JobDescriptionRow,
    results: Vec<ShortlistResultRow>,
    threshold: f64,
) -> ShortlistReport {
    let total_candidates = results.len();
    let (shortlisted, rejected) = partition_by_threshold(results, threshold);

    ShortlistReport {
        shortlist_id,
        job_description,
        shortlisted_count: shortlisted.len(),
        rejected_count: rejected.len(),
        shortlisted,
        rejected,
        threshold,
        total_candidates,
    }
}

async fn fetch_owned_job(
    pool: &PgPool,
    owner_id: &str,
    job_description_id: Uuid,
) -> Result<JobDescriptionRow, AppError> {
    sqlx::query_as::<_, JobDescriptionRow>(
        "SELECT * FROM job_descriptions WHERE id = $1 AND owner_id = $2",
    )
    .bind(job_description_id)
    .bind(owner_id)
    .fetch_optional(pool)
    .await?
    .ok_or_else(|| {
        AppError::NotFound(format!(
            "Job description {job_description_id} not found or not accessible"
        ))
    })
}

/// Resolves the candidate set in the caller-supplied order. Every id must
/// reference a CV owned by the caller; otherwise the whole call is rejected
/// with the full list of offending ids.
async fn fetch_owned_cvs(
    pool: &PgPool,
    owner_id: &str,
    cv_ids: &[Uuid],
) -> Result<Vec<CvRow>, AppError> {
    let rows = sqlx::query_as::<_, CvRow>(
        "SELECT * FROM cvs WHERE owner_id = $1 AND id = ANY($2)",
    )
    .bind(owner_id)
    .bind(cv_ids)
    .fetch_all(pool)
    .await?;

    let by_id: std::collections::HashMap<Uuid, CvRow> =
        rows.into_iter().map(|cv| (cv.id, cv)).collect();

    let missing: Vec<String> = cv_ids
        .iter()
        .filter(|id| !by_id.contains_key(id))
        .map(|id| id.to_string())
        .collect();

    if !missing.is_empty() {
        return Err(AppError::NotFound(format!(
            "CVs not found or not accessible: {}",
            missing.join(", ")
        )));
    }

    Ok(cv_ids.iter().map(|id| by_id[id].clone()).collect())
}

/// All prior runs for a caller, newest first.
pub async fn get_shortlist_history(
    pool: &PgPool,
    owner_id: &str,
) -> Result<Vec<ShortlistRow>, AppError> {
    Ok(sqlx::query_as::<_, ShortlistRow>(
        "SELECT * FROM shortlists WHERE owner_id = $1 ORDER BY created_at DESC",
    )
    .bind(owner_id)
    .fetch_all(pool)
    .await?)
}

/// One stored run with its results in candidate input order.
pub async fn get_shortlist_detail(
    pool: &PgPool,
    owner_id: &str,
    shortlist_id: Uuid,
) -> Result<ShortlistDetail, AppError> {
    let shortlist = fetch_owned_shortlist(pool, owner_id, shortlist_id).await?;
    let results = fetch_results(pool, shortlist_id).await?;
    Ok(ShortlistDetail { shortlist, results })
}

/// Rebuilds the full report for a stored run by re-partitioning its results
/// at the stored threshold. Scores and assessments are immutable, so this is
/// deterministic.
pub async fn build_stored_report(
    pool: &PgPool,
    owner_id: &str,
    shortlist_id: Uuid,
) -> Result<ShortlistReport, AppError> {
    let shortlist = fetch_owned_shortlist(pool, owner_id, shortlist_id).await?;

    let job = sqlx::query_as::<_, JobDescriptionRow>(
        "SELECT * FROM job_descriptions WHERE id = $1",
    )
    .bind(shortlist.job_description_id)
    .fetch_optional(pool)
    .await?
    .ok_or_else(|| {
        AppError::NotFound(format!(
            "Job description {} not found",
            shortlist.job_description_id
        ))
    })?;

    let results = fetch_results(pool, shortlist_id).await?;
    Ok(assemble_report(shortlist_id, job, results, shortlist.threshold))
}

/// Deletes a run; its results go with it via the cascading foreign key.
pub async fn delete_shortlist(
    pool: &PgPool,
    owner_id: &str,
    shortlist_id: Uuid,
) -> Result<(), AppError> {
    let deleted = sqlx::query("DELETE FROM shortlists WHERE id = $1 AND owner_id = $2")
        .bind(shortlist_id)
        .bind(owner_id)
        .execute(pool)
        .await?
        .rows_affected();

    if deleted == 0 {
        return Err(AppError::NotFound("Shortlist not found".to_string()));
    }

    info!("deleted shortlist {shortlist_id} and its results");
    Ok(())
}

async fn fetch_owned_shortlist(
    pool: &PgPool,
    owner_id: &str,
    shortlist_id: Uuid,
) -> Result<ShortlistRow, AppError> {
    sqlx::query_as::<_, ShortlistRow>(
        "SELECT * FROM shortlists WHERE id = $1 AND owner_id = $2",
    )
    .bind(shortlist_id)
    .bind(owner_id)
    .fetch_optional(pool)
    .await?
    .ok_or_else(|| AppError::NotFound("Shortlist not found".to_string()))
}

async fn fetch_results(
    pool: &PgPool,
    shortlist_id: Uuid,
) -> Result<Vec<ShortlistResultRow>, AppError> {
    Ok(sqlx::query_as::<_, ShortlistResultRow>(
        "SELECT * FROM shortlist_results WHERE shortlist_id = $1 ORDER BY position ASC",
    )
    .bind(shortlist_id)
    .fetch_all(pool)
    .await?)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn result_with_score(position: i32, score: f64) -> ShortlistResultRow {
        ShortlistResultRow {
            id: Uuid::new_v4(),
            shortlist_id: Uuid::new_v4(),
            cv_id: Uuid::new_v4(),
            position,
            score,
            match_summary: "summary".to_string(),
            strengths: vec!["strength".to_string()],
            gaps: vec!["gap".to_string()],
            reasoning: "reasoning".to_string(),
            recommendation: "Consider".to_string(),
        }
    }

    fn job_fixture() -> JobDescriptionRow {
        JobDescriptionRow {
            id: Uuid::new_v4(),
            owner_id: "hm_test".to_string(),
            title: "Backend Engineer".to_string(),
            summary: "Python backend role".to_string(),
            key_requirements: vec!["5 years Python".to_string()],
            content: "Need a backend engineer with 5 years Python".to_string(),
            created_at: chrono::Utc::now(),
        }
    }

    #[test]
    fn test_partition_boundary_is_inclusive() {
        let results = vec![result_with_score(0, 0.6)];
        let (shortlisted, rejected) = partition_by_threshold(results, 0.6);
        assert_eq!(shortlisted.len(), 1);
        assert!(rejected.is_empty());
    }

    #[test]
    fn test_partition_counts_always_sum_to_total() {
        let scores = [0.0, 0.1, 0.5, 0.59, 0.6, 0.61, 0.99, 1.0];
        for threshold in [0.0, 0.3, 0.6, 1.0] {
            let results: Vec<_> = scores
                .iter()
                .enumerate()
                .map(|(i, &s)| result_with_score(i as i32, s))
                .collect();
            let total = results.len();
            let (shortlisted, rejected) = partition_by_threshold(results, threshold);
            assert_eq!(shortlisted.len() + rejected.len(), total);
        }
    }

    #[test]
    fn test_partition_preserves_input_order() {
        let results = vec![
            result_with_score(0, 0.9),
            result_with_score(1, 0.2),
            result_with_score(2, 0.8),
            result_with_score(3, 0.1),
        ];
        let (shortlisted, rejected) = partition_by_threshold(results, 0.5);
        let shortlisted_positions: Vec<_> = shortlisted.iter().map(|r| r.position).collect();
        let rejected_positions: Vec<_> = rejected.iter().map(|r| r.position).collect();
        assert_eq!(shortlisted_positions, vec![0, 2]);
        assert_eq!(rejected_positions, vec![1, 3]);
    }

    #[test]
    fn test_report_two_candidates_around_threshold() {
        // 0.82 shortlisted, 0.41 rejected at threshold 0.6
        let results = vec![result_with_score(0, 0.82), result_with_score(1, 0.41)];
        let report = assemble_report(Uuid::new_v4(), job_fixture(), results, 0.6);

        assert_eq!(report.total_candidates, 2);
        assert_eq!(report.shortlisted_count, 1);
        assert_eq!(report.rejected_count, 1);
        assert!((report.shortlisted[0].score - 0.82).abs() < f64::EPSILON);
        assert!((report.rejected[0].score - 0.41).abs() < f64::EPSILON);
    }

    #[test]
    fn test_report_threshold_zero_shortlists_everyone() {
        let results = vec![result_with_score(0, 0.0), result_with_score(1, 0.4)];
        let report = assemble_report(Uuid::new_v4(), job_fixture(), results, 0.0);
        assert_eq!(report.shortlisted_count, 2);
        assert_eq!(report.rejected_count, 0);
    }

    #[test]
    fn test_report_negative_score_is_rejected_at_any_positive_threshold() {
        // cosine similarity is not clamped; a negative score must classify cleanly
        let results = vec![result_with_score(0, -0.2)];
        let report = assemble_report(Uuid::new_v4(), job_fixture(), results, 0.1);
        assert_eq!(report.rejected_count, 1);
    }
}
