/// 조회 가능한 테이블 탐색 쿼리 (index, date, time, value 컬럼을 모두 가진 테이블)
pub const SELECT_SERIES_TABLES: &str = "
    SELECT table_name::text
    FROM information_schema.columns
    WHERE table_schema::text = $1
      AND column_name IN ('index', 'date', 'time', 'value')
    GROUP BY table_name
    HAVING COUNT(DISTINCT column_name) = 4
    ORDER BY table_name
";
