//! SQL Server data source over tiberius

use tiberius::{Client, Config};
use tokio::net::TcpStream;
use tokio::runtime::Runtime;
use tokio_util::compat::{Compat, TokioAsyncWriteCompatExt};

use super::{Connection, DataSource};
use crate::error::SqlError;

type SqlClient = Client<Compat<TcpStream>>;

/// Blocking SQL Server data source.
///
/// Owns a tokio runtime and one client; connections borrow both.
pub struct MssqlDataSource {
    runtime: Runtime,
    client: SqlClient,
}

impl MssqlDataSource {
    /// Connects using an ADO.NET style connection string
    /// (`Server=host,1433;Database=db;User Id=sa;Password=...`)
    pub fn connect(connection_string: &str) -> Result<Self, SqlError> {
        let config = Config::from_ado_string(connection_string).map_err(to_sql_error)?;
        let runtime = Runtime::new().map_err(|e| SqlError::new(e.to_string()))?;
        let client = runtime.block_on(open(config))?;
        tracing::info!("Connected to SQL Server");
        Ok(Self { runtime, client })
    }
}

async fn open(config: Config) -> Result<SqlClient, SqlError> {
    let tcp = TcpStream::connect(config.get_addr())
        .await
        .map_err(|e| SqlError::new(e.to_string()))?;
    tcp.set_nodelay(true)
        .map_err(|e| SqlError::new(e.to_string()))?;
    Client::connect(config, tcp.compat_write())
        .await
        .map_err(to_sql_error)
}

fn to_sql_error(error: tiberius::error::Error) -> SqlError {
    match &error {
        tiberius::error::Error::Server(token) => {
            SqlError::with_code(token.message(), token.code() as i32)
        }
        _ => SqlError::new(error.to_string()),
    }
}

struct MssqlConnection<'a> {
    runtime: &'a Runtime,
    client: &'a mut SqlClient,
}

impl Connection for MssqlConnection<'_> {
    fn execute(&mut self, sql: &str) -> Result<u64, SqlError> {
        let result = self
            .runtime
            .block_on(self.client.execute(sql, &[]))
            .map_err(to_sql_error)?;
        Ok(result.total())
    }

    fn query_i64(&mut self, sql: &str) -> Result<Option<i64>, SqlError> {
        let client = &mut *self.client;
        let row = self.runtime.block_on(async move {
            client.query(sql, &[]).await?.into_row().await
        });
        let Some(row) = row.map_err(to_sql_error)? else {
            return Ok(None);
        };
        if let Ok(value) = row.try_get::<i64, _>(0) {
            return Ok(value);
        }
        row.try_get::<i32, _>(0)
            .map(|value| value.map(i64::from))
            .map_err(to_sql_error)
    }
}

impl Drop for MssqlConnection<'_> {
    fn drop(&mut self) {
        tracing::trace!("Released SQL Server connection");
    }
}

impl DataSource for MssqlDataSource {
    fn connection(&mut self) -> Result<Box<dyn Connection + '_>, SqlError> {
        Ok(Box::new(MssqlConnection {
            runtime: &self.runtime,
            client: &mut self.client,
        }))
    }
}
