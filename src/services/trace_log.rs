use parking_lot::Mutex;

/// Журнал решений: по одной строке на каждое обработанное событие.
/// Строки добавляются строго в порядке принятия решений и никогда не
/// перезаписываются, поэтому журнал пригоден для проверки порядка в тестах.
pub struct TraceLog {
    records: Mutex<Vec<String>>,
}

impl TraceLog {
    pub fn new() -> Self {
        Self {
            records: Mutex::new(Vec::new()),
        }
    }

    /// Добавляет запись и дублирует её в обычный лог
    pub fn append(&self, record: impl Into<String>) {
        let record = record.into();
        {
            let mut records = self.records.lock();
            records.push(record.clone());
        }
        tracing::info!("{}", record);
    }

    /// Копия всех записей на текущий момент
    #[allow(dead_code)]
    pub fn snapshot(&self) -> Vec<String> {
        self.records.lock().clone()
    }

    #[allow(dead_code)]
    pub fn last(&self) -> Option<String> {
        self.records.lock().last().cloned()
    }

    pub fn len(&self) -> usize {
        self.records.lock().len()
    }

    #[allow(dead_code)]
    pub fn is_empty(&self) -> bool {
        self.records.lock().is_empty()
    }

    /// Число записей, содержащих подстроку
    #[allow(dead_code)]
    pub fn count_matching(&self, needle: &str) -> usize {
        self.records
            .lock()
            .iter()
            .filter(|r| r.contains(needle))
            .count()
    }
}

impl Default for TraceLog {
    fn default() -> Self {
        Self::new()
    }
}
